//! Terminal rendering of the station page.
//!
//! [`render_page`] is pure: it turns controller state into lines so the
//! layout can be tested without a terminal. [`StationScreen`] redraws
//! those lines in place.

use console::{Term, style};

use crate::station::{DisplayElement, PageController, PagePhase, TaskView};
use crate::ui::icons::{CAMERA, CAPTURE, CROSS, EMPLOYEE, SCANNER, WARN};

const DEFAULT_WIDTH: usize = 80;
const MIN_WIDTH: usize = 30;
const THUMBNAIL_CHARS: usize = 40;

pub const CONTROLS_HINT: &str = "[Enter] Завершить  [Tab] Фото  [Esc] Сброс  [Ctrl-C] Выход";
pub const IDLE_HINT: &str = "Отсканируйте бейдж  [Esc] Сброс  [Ctrl-C] Выход";

/// Current terminal width, or a default when not attached to one.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
        .max(MIN_WIDTH)
}

fn wrap_field(label: &str, value: &str, emphasized: bool, width: usize) -> Vec<String> {
    let first = format!("  {}: ", label);
    let indent = " ".repeat(4);
    let options = textwrap::Options::new(width)
        .initial_indent(&first)
        .subsequent_indent(&indent);
    textwrap::wrap(value, options)
        .into_iter()
        .map(|line| {
            if emphasized {
                style(line.into_owned()).bold().to_string()
            } else {
                line.into_owned()
            }
        })
        .collect()
}

/// Wrap free text to single terminal rows. Hard line breaks in `text`
/// start new rows, so every returned entry occupies exactly one row.
fn wrap_text(prefix: &str, text: &str, width: usize, paint: impl Fn(String) -> String) -> Vec<String> {
    let indent = " ".repeat(console::measure_text_width(prefix).min(4));
    let options = textwrap::Options::new(width)
        .initial_indent(prefix)
        .subsequent_indent(&indent);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| paint(line.into_owned()))
        .collect()
}

/// Short description of a photo source for the collapsed state.
fn photo_summary(src: &str) -> String {
    if let Some(rest) = src.strip_prefix("data:")
        && let Some((mime, data)) = rest.split_once(";base64,")
    {
        return format!("{} ({} КБ)", mime, data.len() * 3 / 4 / 1024);
    }
    if src.chars().count() > THUMBNAIL_CHARS {
        let head: String = src.chars().take(THUMBNAIL_CHARS).collect();
        format!("{}…", head)
    } else {
        src.to_string()
    }
}

fn render_photo(src: &str, expanded: bool, width: usize) -> Vec<String> {
    if !expanded || src.starts_with("data:") {
        let hint = if expanded { "" } else { "  [Tab]" };
        return vec![format!("  {}{}{}", CAMERA, photo_summary(src), hint)];
    }
    let options = textwrap::Options::new(width)
        .initial_indent("  ")
        .subsequent_indent("  ")
        .break_words(true);
    let mut lines = vec![format!("  {}Фото", CAMERA)];
    lines.extend(textwrap::wrap(src, options).into_iter().map(|l| l.into_owned()));
    lines
}

fn render_view(view: &TaskView, width: usize) -> Vec<String> {
    match view {
        TaskView::Empty => Vec::new(),
        TaskView::Error(message) => {
            let prefix = format!("  {}", CROSS);
            wrap_text(&prefix, message, width, |l| style(l).red().to_string())
        }
        TaskView::Task {
            elements,
            photo_expanded,
        } => elements
            .iter()
            .flat_map(|element| match element {
                DisplayElement::Field {
                    label,
                    value,
                    emphasized,
                } => wrap_field(label, value, *emphasized, width),
                DisplayElement::Photo { src } => render_photo(src, *photo_expanded, width),
            })
            .collect(),
    }
}

/// Lay out the whole page.
pub fn render_page(page: &PageController, width: usize) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{}{}",
            SCANNER,
            style(format!("Станция: {}", page.station().title())).bold()
        ),
        String::new(),
    ];

    if let Some(message) = page.message() {
        lines.extend(wrap_text(&EMPLOYEE.to_string(), message, width, |l| l));
    }
    if page.phase() == PagePhase::Capturing {
        lines.push(format!("{}{}", CAPTURE, style(page.capture_buffer()).dim()));
    }

    let view = render_view(page.view(), width);
    if !view.is_empty() {
        lines.push(String::new());
        lines.extend(view);
    }

    if let Some(notice) = page.notice() {
        lines.push(String::new());
        lines.extend(wrap_text(&WARN.to_string(), notice, width, |l| {
            style(l).yellow().to_string()
        }));
    }

    lines.push(String::new());
    let hint = if page.controls_visible() {
        CONTROLS_HINT
    } else {
        IDLE_HINT
    };
    lines.extend(wrap_text("", hint, width, |l| style(l).dim().to_string()));
    lines
}

/// Redraws the page in place on stdout.
pub struct StationScreen {
    term: Term,
    drawn: usize,
}

impl StationScreen {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            drawn: 0,
        }
    }

    pub fn draw(&mut self, page: &PageController) -> std::io::Result<()> {
        let lines = render_page(page, terminal_width());
        if self.drawn > 0 {
            self.term.clear_last_lines(self.drawn)?;
        }
        for line in &lines {
            self.term.write_line(line)?;
        }
        self.drawn = lines.len();
        Ok(())
    }

    pub fn term(&self) -> &Term {
        &self.term
    }
}

impl Default for StationScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureMode, Key};
    use crate::protocol::{LogResponse, Station, TaskData};
    use serde_json::json;

    fn page_with_task(fields: serde_json::Value) -> PageController {
        let mut page = PageController::new(Station::Sewing, CaptureMode::Sequence);
        let mut pending = Vec::new();
        for key in Key::sequence("(1)") {
            pending.extend(page.on_key(&key));
        }
        page.apply_log_response(
            &pending[0],
            Ok(LogResponse {
                sequence: Some("Иванов".to_string()),
                task: Some(TaskData::from_value(fields).unwrap()),
            }),
        );
        page
    }

    fn joined(lines: &[String]) -> String {
        console::strip_ansi_codes(&lines.join("\n")).into_owned()
    }

    #[test]
    fn test_idle_page() {
        let page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        let text = joined(&render_page(&page, 80));
        assert!(text.contains("Станция: Сборка"));
        assert!(text.contains(IDLE_HINT));
        assert!(!text.contains("[Enter]"));
    }

    #[test]
    fn test_task_page_shows_fields_and_controls() {
        let page = page_with_task(json!({"Артикул": "M-10", "Размер": "160x200"}));
        let text = joined(&render_page(&page, 80));
        assert!(text.contains("Считанная последовательность: Иванов"));
        assert!(text.contains("Артикул: M-10"));
        assert!(text.contains("Размер: 160x200"));
        assert!(text.contains(CONTROLS_HINT));
    }

    #[test]
    fn test_long_values_wrap() {
        let page = page_with_task(json!({"Комментарий": "слово ".repeat(20)}));
        let lines = render_page(&page, 40);
        let field_lines: Vec<_> = lines.iter().filter(|l| l.contains("слово")).collect();
        assert!(field_lines.len() > 1);
        assert!(field_lines.iter().all(|l| console::measure_text_width(l) <= 40));
    }

    #[test]
    fn test_data_url_photo_is_summarised() {
        let page = page_with_task(json!({"Фото": "data:image/png;base64,AAAA"}));
        let text = joined(&render_page(&page, 80));
        assert!(text.contains("image/png"));
        assert!(!text.contains("AAAA"));
    }

    #[test]
    fn test_capture_in_progress_is_shown() {
        let mut page = PageController::new(Station::Gluing, CaptureMode::Sequence);
        for key in Key::sequence("(12") {
            page.on_key(&key);
        }
        let text = joined(&render_page(&page, 80));
        assert!(text.contains("12"));
    }

    #[test]
    fn test_multiline_error_is_one_row_per_entry() {
        let page = page_with_task(json!({"error": "Сотрудник не найден.\n\nЖду штрих-код..."}));
        assert!(page.view().error().is_some());
        let lines = render_page(&page, 40);
        assert!(lines.iter().all(|l| !l.contains('\n')));
        assert!(lines.iter().all(|l| console::measure_text_width(l) <= 40));
        let text = joined(&lines);
        assert!(text.contains("Сотрудник не найден."));
        assert!(text.contains("Жду штрих-код..."));
    }

    #[test]
    fn test_photo_summary_truncates_urls() {
        let url = format!("http://img/{}", "a".repeat(100));
        assert!(photo_summary(&url).ends_with('…'));
        assert_eq!(photo_summary("http://x/1.jpg"), "http://x/1.jpg");
    }
}
