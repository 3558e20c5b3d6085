use std::fmt;

/// Formats a service latency the way the list view shows it.
pub fn format_latency(ms: f64) -> String {
    format!("{ms:.4} ms")
}

/// Latency/page indicator. Pure projection of what the caller supplies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerTiming {
    latency: Option<String>,
    page: Option<u32>,
}

impl ServerTiming {
    pub fn new(latency: Option<String>, page: Option<u32>) -> Self {
        Self { latency, page }
    }

    pub fn render(&self) -> Option<String> {
        self.latency.as_ref()?;
        Some(self.to_string())
    }
}

impl fmt::Display for ServerTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(latency) = &self.latency else {
            return Ok(());
        };
        write!(f, "Speed: {latency}")?;
        if let Some(page) = self.page {
            write!(f, " | Page: {page}")?;
        }
        Ok(())
    }
}
