use crate::utils::time::epoch_to_rfc3339;

/// A top-level container in the object-store account. The creation
/// date is informational only; it plays no role in listing.
#[derive(Debug, Clone)]
pub struct Bucket {
    name: String,
    creation_date: Option<u64>,
}

impl Bucket {
    pub fn new(name: String, creation_date: Option<u64>) -> Self {
        Bucket {
            name,
            creation_date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn creation_date(&self) -> Option<u64> {
        self.creation_date
    }

    pub fn creation_date_printable(&self) -> String {
        match self.creation_date {
            Some(epoch) => epoch_to_rfc3339(epoch)
                .unwrap_or_else(|_| "-".to_string()),
            None => "-".to_string(),
        }
    }
}
