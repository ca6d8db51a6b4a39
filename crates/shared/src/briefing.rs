use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{NewsDigest, NewsItem};

pub struct BriefingGenerator;

impl BriefingGenerator {
    /// Heading that matches the time of day the briefing is prepared.
    pub fn briefing_title(hour: u32) -> &'static str {
        match hour {
            5..=11 => "Morning Briefing",
            12..=17 => "Afternoon Briefing",
            18..=22 => "Evening Briefing",
            _ => "Night Briefing",
        }
    }

    fn summary_lines(item: &NewsItem) -> Vec<&str> {
        item.summary
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn generate(digest: &NewsDigest, title: &str, prepared: NaiveDateTime) -> String {
        let mut html = String::new();

        // Format date as "Tuesday, 10 March 2026"
        let formatted_date = digest.logical_date.format("%A, %-d %B %Y").to_string();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str(&format!(
            "  <title>{} - {}</title>\n",
            Self::escape_html(title),
            formatted_date
        ));
        html.push_str("  <style>\n");
        html.push_str("    body { font-family: Arial, sans-serif; max-width: 900px; margin: 40px auto; padding: 0 20px; line-height: 1.6; }\n");
        html.push_str("    h1 { color: #2c3e50; border-bottom: 3px solid #3498db; padding-bottom: 10px; text-align: center; }\n");
        html.push_str("    h1 .topic { display: block; font-size: 0.8em; font-weight: normal; color: #555; }\n");
        html.push_str("    h1 .prepared { display: block; font-size: 0.7em; font-weight: normal; color: #888; margin-top: 5px; }\n");
        html.push_str("    h3 { color: #2c3e50; margin-top: 25px; }\n");
        html.push_str("    .metadata { color: #7f8c8d; font-size: 0.9em; margin: 5px 0; }\n");
        html.push_str("    .link { color: #3498db; text-decoration: none; }\n");
        html.push_str("    .summary { margin: 10px 0; padding: 10px; background-color: #f8f9fa; border-radius: 4px; }\n");
        html.push_str("    hr { border: none; border-top: 1px solid #ddd; margin: 30px 0; }\n");
        html.push_str("    .empty { color: #7f8c8d; font-style: italic; text-align: center; }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n<body>\n");

        html.push_str(&format!(
            "<h1>{}<span class=\"topic\">{} &middot; {}</span><span class=\"prepared\">(Prepared {})</span></h1>\n",
            Self::escape_html(title),
            Self::escape_html(&digest.topic),
            formatted_date,
            prepared.format("%H:%M")
        ));

        if digest.articles.is_empty() {
            html.push_str("<p class=\"empty\">No new news since the last briefing.</p>\n");
        }

        for (index, item) in digest.articles.iter().enumerate() {
            html.push_str(&format!(
                "<h3>{}. {}</h3>\n",
                index + 1,
                Self::escape_html(&item.cleaned_title)
            ));
            html.push_str("<div class=\"metadata\">\n");
            html.push_str(&format!(
                "  <strong>Link:</strong> <a href=\"{}\" class=\"link\" target=\"_blank\">{}</a><br>\n",
                Self::escape_html(&item.link),
                Self::escape_html(&item.link)
            ));
            html.push_str(&format!(
                "  <strong>Date:</strong> {}\n",
                Self::escape_html(&item.formatted_date)
            ));
            html.push_str("</div>\n");

            let lines = Self::summary_lines(item);
            if !lines.is_empty() {
                html.push_str("<div class=\"summary\">\n");
                for line in lines {
                    html.push_str(&format!("  <p>{}</p>\n", Self::escape_html(line)));
                }
                html.push_str("</div>\n");
            }
            html.push_str("<hr>\n");
        }

        html.push_str("</body>\n</html>");
        html
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    pub fn generate_org_mode(digest: &NewsDigest, title: &str) -> String {
        let mut org = String::new();

        org.push_str(&format!("#+TITLE: {}: {}\n", title, digest.topic));
        org.push_str(&format!("#+DATE: {}\n\n", digest.logical_date.format("%Y-%m-%d")));

        if digest.articles.is_empty() {
            org.push_str("No new news since the last briefing.\n");
            return org;
        }

        for item in &digest.articles {
            org.push_str(&format!("* {}\n\n", item.cleaned_title));
            org.push_str(&format!("** URL\n{}\n\n", item.link));
            org.push_str(&format!("** Date\n{}\n\n", item.formatted_date));

            let lines = Self::summary_lines(item);
            if !lines.is_empty() {
                org.push_str("** Summary\n");
                for line in lines {
                    org.push_str(&format!("- {}\n", line));
                }
                org.push('\n');
            }
        }

        org
    }

    /// Save a rendered briefing next to the digest it was built from.
    pub fn save(content: &str, dir: &Path, digest: &NewsDigest, extension: &str) -> Result<PathBuf> {
        let filename = format!(
            "briefing_{}.{}",
            digest.logical_date.format("%Y-%m-%d"),
            extension
        );
        let filepath = dir.join(filename);

        fs::write(&filepath, content)
            .with_context(|| format!("Failed to write briefing file: {}", filepath.display()))?;

        Ok(filepath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn item(title: &str, summary: &str) -> NewsItem {
        NewsItem {
            cleaned_title: title.to_string(),
            summary: summary.to_string(),
            link: "https://n.news.naver.com/article/001".to_string(),
            publication_date: "Tue, 10 Mar 2026 09:30:00 +0900".to_string(),
            formatted_date: "2026-03-10 09:30".to_string(),
        }
    }

    fn digest(articles: Vec<NewsItem>) -> NewsDigest {
        NewsDigest::new("경제", NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(), articles)
    }

    fn prepared() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(7, 45, 0)
            .unwrap()
    }

    #[test]
    fn test_briefing_title_by_hour() {
        assert_eq!(BriefingGenerator::briefing_title(4), "Night Briefing");
        assert_eq!(BriefingGenerator::briefing_title(5), "Morning Briefing");
        assert_eq!(BriefingGenerator::briefing_title(12), "Afternoon Briefing");
        assert_eq!(BriefingGenerator::briefing_title(18), "Evening Briefing");
        assert_eq!(BriefingGenerator::briefing_title(23), "Night Briefing");
    }

    #[test]
    fn test_escape_html_combined() {
        assert_eq!(
            BriefingGenerator::escape_html("<a href=\"test\">Click & Go</a>"),
            "&lt;a href=&quot;test&quot;&gt;Click &amp; Go&lt;/a&gt;"
        );
        assert_eq!(BriefingGenerator::escape_html("It's here"), "It&#39;s here");
    }

    #[test]
    fn test_generate_html() {
        let digest = digest(vec![
            item("기준금리 인상", "첫 문장.\n둘째 문장.\n\n셋째 문장."),
            item("Apple & Google <deal>", ""),
        ]);
        let html = BriefingGenerator::generate(&digest, "Morning Briefing", prepared());

        assert!(html.contains("<title>Morning Briefing - Tuesday, 10 March 2026</title>"));
        assert!(html.contains("경제"));
        assert!(html.contains("(Prepared 07:45)"));
        assert!(html.contains("<h3>1. 기준금리 인상</h3>"));
        assert!(html.contains("<p>둘째 문장.</p>"));
        assert!(html.contains("<h3>2. Apple &amp; Google &lt;deal&gt;</h3>"));
        assert_eq!(html.matches("class=\"summary\"").count(), 1);
        assert!(html.contains("2026-03-10 09:30"));
    }

    #[test]
    fn test_generate_html_without_news() {
        let html = BriefingGenerator::generate(&digest(Vec::new()), "Night Briefing", prepared());
        assert!(html.contains("No new news since the last briefing."));
    }

    #[test]
    fn test_generate_org_mode() {
        let digest = digest(vec![item("기준금리 인상", "첫 문장.\n둘째 문장.")]);
        let org = BriefingGenerator::generate_org_mode(&digest, "Morning Briefing");

        assert!(org.contains("#+TITLE: Morning Briefing: 경제"));
        assert!(org.contains("#+DATE: 2026-03-10"));
        assert!(org.contains("* 기준금리 인상"));
        assert!(org.contains("** URL\nhttps://n.news.naver.com/article/001"));
        assert!(org.contains("- 첫 문장.\n- 둘째 문장.\n"));
    }

    #[test]
    fn test_generate_org_mode_skips_empty_summary() {
        let org = BriefingGenerator::generate_org_mode(&digest(vec![item("Title", "")]), "Briefing");
        assert!(!org.contains("** Summary"));
    }

    #[test]
    fn test_save() {
        let dir = TempDir::new().unwrap();
        let digest = digest(Vec::new());
        let path = BriefingGenerator::save("<html></html>", dir.path(), &digest, "html").unwrap();

        assert_eq!(path, dir.path().join("briefing_2026-03-10.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
