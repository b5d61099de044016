//! Synthetic CM1200 status pages for integration tests

#![allow(dead_code)]

/// Number of lines in the generated page, enough to cover every table line
const PAGE_LINES: usize = 340;

pub const SUMMARY_LINE: usize = 176;
pub const UPSTREAM_LINE: usize = 253;
pub const DOWNSTREAM_LINE: usize = 306;

/// Builder for a status page body
pub struct StatusPage {
    device_name: String,
    downstream_partial: String,
    upstream_partial: String,
    downstream: Vec<(String, u64)>,
    upstream: Vec<String>,
}

impl StatusPage {
    pub fn new(device_name: &str) -> Self {
        Self {
            device_name: device_name.to_string(),
            downstream_partial: "0".to_string(),
            upstream_partial: "0".to_string(),
            downstream: Vec::new(),
            upstream: Vec::new(),
        }
    }

    pub fn partial(mut self, downstream: &str, upstream: &str) -> Self {
        self.downstream_partial = downstream.to_string();
        self.upstream_partial = upstream.to_string();
        self
    }

    pub fn downstream_channel(mut self, lock: &str, uncorrectable: u64) -> Self {
        self.downstream.push((lock.to_string(), uncorrectable));
        self
    }

    pub fn upstream_channel(mut self, lock: &str) -> Self {
        self.upstream.push(lock.to_string());
        self
    }

    fn summary_literal(&self) -> String {
        let mut fields: Vec<String> = (0..16).map(|i| i.to_string()).collect();
        fields[10] = self.device_name.clone();
        fields[12] = self.downstream_partial.clone();
        fields[13] = self.upstream_partial.clone();
        fields.join("|")
    }

    fn downstream_literal(&self) -> String {
        let mut out = format!("{}|", self.downstream.len());
        for (i, (lock, uncorrectable)) in self.downstream.iter().enumerate() {
            out.push_str(&format!(
                "{}|{}|QAM256|{}|{} Hz|3.1|41.0|{}|{}|",
                i + 1,
                lock,
                i + 20,
                567_000_000 + i * 6_000_000,
                1000 + i,
                uncorrectable
            ));
        }
        out
    }

    fn upstream_literal(&self) -> String {
        let mut out = String::new();
        for (i, lock) in self.upstream.iter().enumerate() {
            out.push_str(&format!(
                "{}|{}|{}|ATDMA|{}|5120 Ksym/sec|{} Hz|",
                i + 1,
                i + 1,
                lock,
                i + 1,
                16_400_000 + i * 6_400_000
            ));
        }
        out
    }

    pub fn build(&self) -> String {
        let mut lines: Vec<String> = (0..PAGE_LINES)
            .map(|i| format!("<!-- line {} -->", i))
            .collect();
        lines[0] = "<html>".to_string();
        lines[SUMMARY_LINE] = format!("var tagValueList = '{}';", self.summary_literal());
        lines[UPSTREAM_LINE] = format!("  var tagValueList = '{}';", self.upstream_literal());
        lines[DOWNSTREAM_LINE] = format!("  var tagValueList = '{}';", self.downstream_literal());
        lines[PAGE_LINES - 1] = "</html>".to_string();
        lines.join("\n")
    }
}

/// Every channel locked, no partial service
pub fn healthy_page() -> String {
    let mut page = StatusPage::new("CM1200");
    for i in 0..8 {
        page = page.downstream_channel("Locked", i);
    }
    for _ in 0..4 {
        page = page.upstream_channel("Locked");
    }
    page.build()
}

/// Partial service both ways with unlocked channels
pub fn degraded_page() -> String {
    StatusPage::new("CM1200")
        .partial("1", "1")
        .downstream_channel("Locked", 120)
        .downstream_channel("Not Locked", 0)
        .downstream_channel("Not Locked", 0)
        .downstream_channel("Locked", 7)
        .upstream_channel("Locked")
        .upstream_channel("Not Locked")
        .build()
}
