//! Text output formatting with colors.

use chrono::{DateTime, Local, Utc};
use serde_json::Value;
use traktor_core::AuthRequirement;
use traktor_providers::ProviderDescriptor;

use super::json::{EndpointOutput, ResponseOutput};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats provider list header.
    pub fn format_providers_header(&self) -> String {
        format!(
            "{:<8} {:<10} {:<32} {}",
            self.bold("CLI"),
            self.bold("Provider"),
            self.bold("Endpoint"),
            self.bold("Auth")
        )
    }

    /// Formats a single provider line.
    pub fn format_provider_line(&self, desc: &ProviderDescriptor) -> String {
        format!(
            "{:<8} {:<10} {:<32} {}",
            desc.cli_name(),
            desc.display_name(),
            desc.metadata.default_endpoint,
            self.dim(desc.metadata.auth_scheme)
        )
    }

    /// Formats a provider's endpoint list.
    pub fn format_endpoints(&self, provider: &str, endpoints: &[EndpointOutput]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} endpoints", self.bold(provider)));
        lines.push("─".repeat(60));

        let width = endpoints.iter().map(|e| e.path.len()).max().unwrap_or(0);
        for endpoint in endpoints {
            let mut flags = Vec::new();
            match endpoint.auth {
                AuthRequirement::Required => flags.push(self.yellow("auth")),
                AuthRequirement::Optional => flags.push(self.dim("auth?")),
                AuthRequirement::None => {}
            }
            if endpoint.cached {
                let label = match endpoint.retention_secs {
                    Some(secs) => format!("cached {}", format_seconds(secs)),
                    None => "cached".to_string(),
                };
                flags.push(self.green(&label));
            }
            if endpoint.paginated {
                flags.push(self.dim("paged"));
            }

            lines.push(format!(
                "{:<width$}  {:<6} {} {}",
                endpoint.path,
                endpoint.method,
                endpoint.url,
                flags.join(" ")
            ));

            if !endpoint.required.is_empty() {
                lines.push(format!(
                    "{:<width$}  {}",
                    "",
                    self.dim(&format!("requires: {}", endpoint.required.join(", ")))
                ));
            }
            for (name, condition) in &endpoint.required_when {
                lines.push(format!(
                    "{:<width$}  {}",
                    "",
                    self.dim(&format!("requires {name} when {condition}"))
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!("Total: {} endpoints", endpoints.len()));
        lines.join("\n")
    }

    /// Formats a call's response: a status line, cache and paging details,
    /// then the body.
    pub fn format_response(&self, response: &ResponseOutput) -> String {
        let mut lines = Vec::new();

        let status = format!("HTTP {}", response.status);
        let status = if (200..300).contains(&response.status) {
            self.green(&status)
        } else {
            self.red(&status)
        };
        lines.push(format!("{} {}", status, self.dim(&response.url)));

        if response.from_cache {
            let when = response
                .cached_at
                .map(|at| format!(" (cached {})", format_timestamp(at)))
                .unwrap_or_default();
            lines.push(self.cyan(&format!("Served from cache{when}")));
        }

        if let Some(pagination) = &response.pagination {
            let mut parts = Vec::new();
            if let Some(page) = pagination.page {
                match pagination.page_count {
                    Some(count) => parts.push(format!("page {page}/{count}")),
                    None => parts.push(format!("page {page}")),
                }
            }
            if let Some(items) = pagination.item_count {
                parts.push(format!("{items} items"));
            }
            if pagination.has_next() {
                parts.push("more available".to_string());
            }
            if !parts.is_empty() {
                lines.push(self.dim(&parts.join(", ")));
            }
        }

        for (name, value) in &response.headers {
            lines.push(format!("{}: {}", self.bold(name), value));
        }

        lines.push(String::new());
        lines.push(format_body(&response.body));
        lines.join("\n")
    }

    /// Formats a titled section of `label: value` rows.
    pub fn format_section(&self, title: &str, rows: &[(&str, String)]) -> String {
        let mut lines = vec![self.bold(title)];
        let width = rows.iter().map(|(label, _)| label.len() + 1).max().unwrap_or(0);
        for (label, value) in rows {
            lines.push(format!("  {:<width$} {}", format!("{label}:"), value));
        }
        lines.join("\n")
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Pretty-prints JSON bodies; strings are printed raw.
fn format_body(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Formats a duration in seconds with the largest whole unit.
pub fn format_seconds(secs: u64) -> String {
    match secs {
        0 => "0s".to_string(),
        s if s % 86_400 == 0 => format!("{}d", s / 86_400),
        s if s % 3_600 == 0 => format!("{}h", s / 3_600),
        s if s % 60 == 0 => format!("{}m", s / 60),
        s => format!("{s}s"),
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============================================================================
// Tests
// ============================================================================
