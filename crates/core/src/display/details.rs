//! Detail view for a single selected torrent.

use colored::Colorize;

use crate::search::TorrentRecord;

use super::date::format_date;
use super::size::display_size;

/// Render the detail block shown before download, one line per entry.
pub fn render_details(record: &TorrentRecord) -> String {
    let mut lines = vec![
        String::new(),
        "Torrent Details:".bold().underline().to_string(),
        format!("{} {}", "Title:".bold(), record.title.white()),
    ];

    if let Some(size) = &record.size_text {
        lines.push(format!("{} {}", "Size:".bold(), display_size(size).yellow()));
    }
    if let Some(seeds) = record.seeds {
        lines.push(format!("{} {}", "Seeders:".bold(), seeds.to_string().green()));
    }
    if let Some(peers) = record.peers {
        lines.push(format!("{} {}", "Leechers:".bold(), peers.to_string().red()));
    }
    if let Some(uploaded) = &record.uploaded_at {
        lines.push(format!("{} {}", "Uploaded:".bold(), format_date(uploaded).magenta()));
    }
    lines.push(format!("{} {}", "Provider:".bold(), record.provider.as_str().blue()));

    if let Some(description) = &record.description {
        lines.push(String::new());
        lines.push("Description:".bold().to_string());
        lines.push(description.white().to_string());
    }
    if let Some(link) = &record.detail_link {
        lines.push(String::new());
        lines.push(format!("{} {}", "Link:".bold(), link.cyan()));
    }

    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::record;

    #[test]
    fn test_details_include_present_fields_only() {
        let mut torrent = record("Ubuntu 24.04", "1337x", Some(42));
        torrent.size_text = Some("1.5 GB".to_string());
        torrent.detail_link = Some("https://example.org/t/1".to_string());

        let text = render_details(&torrent);
        assert!(text.contains("Ubuntu 24.04"));
        assert!(text.contains("1.5 GB"));
        assert!(text.contains("42"));
        assert!(text.contains("1337x"));
        assert!(text.contains("https://example.org/t/1"));
        assert!(!text.contains("Leechers:"));
        assert!(!text.contains("Description:"));
    }
}
