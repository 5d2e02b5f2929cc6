use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub fn rfc3339_to_epoch(timestamp: &str) -> Result<u64, time::Error> {
    let datetime = OffsetDateTime::parse(timestamp, &Rfc3339)?;
    Ok(datetime.unix_timestamp() as u64)
}

pub fn epoch_to_rfc3339(timestamp: u64) -> Result<String, time::Error> {
    let datetime = OffsetDateTime::from_unix_timestamp(timestamp as i64)?;
    Ok(datetime.format(&Rfc3339)?)
}

pub struct UtcTimeNow {
    year: u32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl UtcTimeNow {
    pub fn new() -> UtcTimeNow {
        let now = OffsetDateTime::now_utc();
        UtcTimeNow {
            year: now.year() as u32,
            month: now.month() as u8,
            day: now.day(),
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
        }
    }

    pub fn date_stamp(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }

    pub fn x_amz_date(&self) -> String {
        format!(
            "{}T{:02}{:02}{:02}Z",
            &self.date_stamp(),
            self.hour,
            self.minute,
            self.second
        )
    }
}

impl Default for UtcTimeNow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_round_trip() {
        let epoch = rfc3339_to_epoch("2012-02-15T21:03:02Z").unwrap();
        assert_eq!(epoch, 1329339782);
        assert_eq!(
            epoch_to_rfc3339(epoch).unwrap(),
            "2012-02-15T21:03:02Z"
        );
    }
}
