use std::io::{self, IsTerminal, Write};

use chrono::Local;
use postboard_state::model::{Comment, Post, Reactions};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

const TITLE_EXCERPT: usize = 30;
const BODY_EXCERPT: usize = 50;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);
        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, posts))]
    pub fn print_post_table(&mut self, posts: &[Post]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if posts.is_empty() {
            writeln!(out, "No posts available")?;
            writeln!(out, "Try different search terms or filters")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Title".to_string(),
            "Reactions".to_string(),
            "Tags".to_string(),
            "Excerpt".to_string(),
        ];

        let rows = posts
            .iter()
            .map(|post| {
                vec![
                    self.paint(&post.id.to_string(), "33"),
                    post.title_excerpt(TITLE_EXCERPT),
                    reactions_label(&post.reactions),
                    post.tags.iter().map(|tag| format!("#{tag}")).collect::<Vec<_>>().join(" "),
                    post.body_excerpt(BODY_EXCERPT),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, post, comments))]
    pub fn print_post_detail(&mut self, post: &Post, comments: &[Comment]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "{}", self.paint(&post.title, "1"))?;
        writeln!(out, "id        {}", post.id)?;
        writeln!(out, "tags      {}", post.tags.join(", "))?;
        writeln!(out, "reactions {}", reactions_label(&post.reactions))?;
        if let Some(views) = post.views {
            writeln!(out, "views     {views}")?;
        }
        writeln!(out, "image     {}", post.image_url())?;
        writeln!(out)?;
        writeln!(out, "{}", post.body)?;
        writeln!(out)?;
        writeln!(out, "{}", self.paint("Comments", "1"))?;

        if comments.is_empty() {
            writeln!(out, "No comments yet.")?;
        }
        for comment in comments {
            self.write_comment(&mut out, comment)?;
        }

        Ok(())
    }

    pub fn print_comment(&mut self, comment: &Comment) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_comment(&mut out, comment)
    }

    pub fn print_tags<'a, I>(&mut self, tags: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut out = io::stdout().lock();
        let mut any = false;
        for tag in tags {
            writeln!(out, "{}", self.paint(tag, "36"))?;
            any = true;
        }
        if !any {
            writeln!(out, "No tags available")?;
        }
        Ok(())
    }

    pub fn print_notice(&mut self, message: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", self.paint(message, "2"))?;
        Ok(())
    }

    fn write_comment<W: Write>(&self, out: &mut W, comment: &Comment) -> anyhow::Result<()> {
        let when = comment
            .created_at
            .map(|at| format!(" ({})", at.with_timezone(&Local).format("%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        writeln!(out, "- {}{}", self.paint(comment.author(), "32"), when)?;
        writeln!(out, "  {}", comment.body)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

pub fn reactions_label(reactions: &Reactions) -> String {
    match reactions.dislikes() {
        Some(dislikes) => format!("+{} -{}", reactions.likes(), dislikes),
        None => format!("+{}", reactions.likes()),
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_setting_uses_config_booleans() {
        let mut cfg = Config::defaults();
        cfg.apply_overrides(vec![("color".to_string(), "y".to_string())]);
        assert!(Renderer::new(&cfg).expect("renderer").color);

        cfg.apply_overrides(vec![("color".to_string(), "maybe".to_string())]);
        assert!(Renderer::new(&cfg).is_err());
    }

    #[test]
    fn reactions_label_matches_shape() {
        assert_eq!(reactions_label(&Reactions::Count(4)), "+4");
        assert_eq!(
            reactions_label(&Reactions::Split { likes: 3, dislikes: 1 }),
            "+3 -1"
        );
    }

    #[test]
    fn table_aligns_on_visible_width() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            vec!["ID".into(), "Title".into()],
            vec![vec!["\x1b[33m1\x1b[0m".into(), "héllo".into()]],
        )
        .expect("table");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID Title ");
        assert_eq!(lines[1], "-- ----- ");
        assert_eq!(strip_ansi(lines[2]), "1  héllo ");
    }
}
