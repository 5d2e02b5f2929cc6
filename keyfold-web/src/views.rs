use keyfold::{Bucket, Entry};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, \
         initial-scale=1\">\n\
         <title>{}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2rem auto; \
         max-width: 48rem; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         td, th {{ text-align: left; padding: 0.3rem 0.8rem 0.3rem 0; \
         border-bottom: 1px solid #ddd; }}\n\
         a {{ text-decoration: none; }}\n\
         .kind {{ color: #888; }}\n\
         </style>\n\
         </head>\n\
         <body>\n{}\n</body>\n\
         </html>\n",
        escape_html(title),
        body
    )
}

pub fn buckets_page(buckets: &[Bucket]) -> String {
    let mut rows = String::new();
    for bucket in buckets {
        rows.push_str(&format!(
            "<tr><td><a href=\"/buckets/{}\">{}</a></td>\
             <td>{}</td></tr>\n",
            encode_path_segment(bucket.name()),
            escape_html(bucket.name()),
            escape_html(&bucket.creation_date_printable()),
        ));
    }
    if rows.is_empty() {
        rows.push_str("<tr><td colspan=\"2\">no buckets</td></tr>\n");
    }

    let body = format!(
        "<h1>Buckets</h1>\n\
         <table>\n\
         <tr><th>Name</th><th>Created</th></tr>\n\
         {}</table>",
        rows
    );
    layout("Buckets", &body)
}

pub fn entries_page(
    bucket: &str,
    prefix: &str,
    entries: &[Entry],
) -> String {
    let mut rows = String::new();

    if let Some(parent) = parent_prefix(prefix) {
        rows.push_str(&format!(
            "<tr><td><a href=\"{}\">..</a></td>\
             <td class=\"kind\"></td></tr>\n",
            browse_href(bucket, &parent),
        ));
    }

    for entry in entries {
        if let Some(child_prefix) = entry.child_prefix() {
            rows.push_str(&format!(
                "<tr><td><a href=\"{}\">{}/</a></td>\
                 <td class=\"kind\">folder</td></tr>\n",
                browse_href(bucket, child_prefix),
                escape_html(entry.name()),
            ));
        } else {
            rows.push_str(&format!(
                "<tr><td>{}</td>\
                 <td class=\"kind\">object</td></tr>\n",
                escape_html(entry.name()),
            ));
        }
    }
    if entries.is_empty() {
        rows.push_str("<tr><td colspan=\"2\">empty</td></tr>\n");
    }

    let heading = if prefix.is_empty() {
        bucket.to_string()
    } else {
        format!("{}/{}", bucket, prefix.trim_end_matches('/'))
    };
    let body = format!(
        "<p><a href=\"/\">Buckets</a></p>\n\
         <h1>{}</h1>\n\
         <table>\n{}</table>",
        escape_html(&heading),
        rows
    );
    layout(&heading, &body)
}

pub fn error_page(status: u16, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n\
         <p><a href=\"/\">Back to buckets</a></p>",
        status,
        escape_html(message)
    );
    layout(&format!("Error {}", status), &body)
}

fn browse_href(bucket: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        format!("/buckets/{}", encode_path_segment(bucket))
    } else {
        format!(
            "/buckets/{}?prefix={}",
            encode_path_segment(bucket),
            utf8_percent_encode(prefix, NON_ALPHANUMERIC)
        )
    }
}

fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string()
}

/// One level up from a normalized prefix; None at the root.
fn parent_prefix(prefix: &str) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    let trimmed = prefix.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(position) => Some(trimmed[..=position].to_string()),
        None => Some(String::new()),
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
