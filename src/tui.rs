//! Terminal front-end for the find-and-replace form.
//!
//! Layout, top to bottom: the source folder, the instruction list, the two
//! text inputs and a key help line. Dialogs and the folder picker are drawn
//! as centered overlays.

use crate::app::{DialogKind, FindReplaceForm, Focus};
use crate::config::ConfigLoader;
use crate::errors::Result;
use crate::folder_picker::{FolderPicker, PickerOutcome};
use crate::replacer::{FindAndReplace, ProcessOptions};
use crate::templates::TemplateWhitelist;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::env;
use std::io::{Stdout, stdout};
use std::path::PathBuf;

type Term = Terminal<CrosstermBackend<Stdout>>;

struct Ui {
    form: FindReplaceForm,
    engine: FindAndReplace,
    picker: Option<FolderPicker>,
}

impl Ui {
    fn open_picker(&mut self) {
        self.picker = Some(FolderPicker::open(self.form.source_folder()));
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.form.dialog().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.form.dismiss_dialog();
            }
            return false;
        }

        if let Some(picker) = self.picker.as_mut() {
            match picker_key(picker, key) {
                PickerOutcome::Browsing => {}
                PickerOutcome::Selected(folder) => {
                    self.form.select_folder(Some(folder));
                    self.picker = None;
                }
                PickerOutcome::Cancelled => {
                    self.form.select_folder(None);
                    self.picker = None;
                }
            }
            return false;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('r') if ctrl => self.form.execute(&self.engine),
            KeyCode::F(5) => self.form.execute(&self.engine),
            KeyCode::F(2) => self.open_picker(),
            KeyCode::Delete => self.form.remove_selected(),
            KeyCode::Tab => self.form.focus_next(),
            KeyCode::BackTab => self.form.focus_previous(),
            KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => {}
            code => self.focused_key(code),
        }
        false
    }

    fn focused_key(&mut self, code: KeyCode) {
        match self.form.focus() {
            Focus::Folder => {
                if matches!(code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.open_picker();
                }
            }
            Focus::Find | Focus::Replace => match code {
                KeyCode::Char(c) => self.form.input_char(c),
                KeyCode::Backspace => self.form.backspace(),
                KeyCode::Enter => self.form.add_instruction(),
                _ => {}
            },
            Focus::Instructions => match code {
                KeyCode::Down | KeyCode::Char('j') => self.form.select_next(),
                KeyCode::Up | KeyCode::Char('k') => self.form.select_previous(),
                KeyCode::Backspace | KeyCode::Char('d') => self.form.remove_selected(),
                _ => {}
            },
        }
    }
}

fn picker_key(picker: &mut FolderPicker, key: KeyEvent) -> PickerOutcome {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => picker.next(),
        KeyCode::Up | KeyCode::Char('k') => picker.previous(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => picker.enter(),
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => picker.parent(),
        KeyCode::Char('s') | KeyCode::Char(' ') => {
            return PickerOutcome::Selected(picker.current().to_path_buf());
        }
        KeyCode::Esc => return PickerOutcome::Cancelled,
        _ => {}
    }
    PickerOutcome::Browsing
}

/// Builds the form, optionally pre-filled from a folder and a batch file.
fn prepare(dir: Option<PathBuf>, config: Option<PathBuf>, no_backup: bool) -> Result<Ui> {
    let mut form = FindReplaceForm::new();
    let mut whitelist = TemplateWhitelist::default();

    if let Some(cfg_path) = config {
        let working_dir = match &dir {
            Some(d) => d.clone(),
            None => env::current_dir()?,
        };
        let resolved = ConfigLoader::find_config(&cfg_path, &working_dir)?;
        let batch = ConfigLoader::load_batch_config(&resolved)?;
        for instruction in batch.instructions()? {
            form.push_instruction(instruction);
        }
        if let Some(prefixes) = batch.prefixes {
            whitelist = TemplateWhitelist::new(prefixes);
        }
    }

    if let Some(dir) = dir {
        form.select_folder(Some(dir));
    }

    let engine = FindAndReplace::new()
        .with_whitelist(whitelist)
        .with_options(ProcessOptions {
            create_backup: !no_backup,
            dry_run: false,
        });

    Ok(Ui {
        form,
        engine,
        picker: None,
    })
}

/// The main entry point for the `ui` command.
pub fn run_ui(dir: Option<PathBuf>, config: Option<PathBuf>, no_backup: bool) -> Result<()> {
    let mut ui = prepare(dir, config, no_backup)?;

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut ui);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app(terminal: &mut Term, ui: &mut Ui) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, ui))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && ui.handle_key(key)
        {
            return Ok(());
        }
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw(f: &mut Frame, ui: &Ui) {
    let form = &ui.form;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let folder_text = if form.folder_display().is_empty() {
        Span::styled("(none, press F2)", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(form.folder_display())
    };
    let folder = Paragraph::new(Line::from(folder_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Source Folder")
            .border_style(border_style(form.focus() == Focus::Folder)),
    );
    f.render_widget(folder, chunks[0]);

    let items: Vec<ListItem> = form
        .instructions()
        .iter()
        .map(|i| {
            ListItem::new(Line::from(vec![
                Span::raw(i.find.clone()),
                Span::styled("  ->  ", Style::default().fg(Color::DarkGray)),
                Span::raw(i.replace.clone()),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Find -> Replace")
                .border_style(border_style(form.focus() == Focus::Instructions)),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    let mut list_state = ListState::default().with_selected(form.selected());
    f.render_stateful_widget(list, chunks[1], &mut list_state);

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    for (area, title, text, focus) in [
        (inputs[0], "Find", &form.find_input, Focus::Find),
        (inputs[1], "Replace", &form.replace_input, Focus::Replace),
    ] {
        let focused = form.focus() == focus;
        let input = Paragraph::new(text.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style(focused)),
        );
        f.render_widget(input, area);
        if focused && ui.picker.is_none() && form.dialog().is_none() {
            let x = area.x + 1 + text.chars().count().min(area.width.saturating_sub(3) as usize) as u16;
            f.set_cursor_position((x, area.y + 1));
        }
    }

    let help = Paragraph::new(Line::from(vec![
        Span::raw("Tab: Next field | Enter: Add | Del: Remove | "),
        Span::raw("F2: Folder | F5: Start | Esc: Quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[3]);

    if let Some(picker) = &ui.picker {
        draw_picker(f, picker);
    }

    if let Some(dialog) = form.dialog() {
        let color = match dialog.kind {
            DialogKind::Error => Color::Red,
            DialogKind::Info => Color::Cyan,
        };
        let height = dialog.message.lines().count() as u16 + 4;
        let area = centered(f.area(), 60, height);
        let body = Paragraph::new(format!("{}\n\n[Enter] OK", dialog.message))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(
                        dialog.title.as_str(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ))
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(Clear, area);
        f.render_widget(body, area);
    }
}

fn draw_picker(f: &mut Frame, picker: &FolderPicker) {
    let area = centered(f.area(), 70, f.area().height.saturating_mul(7) / 10);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", picker.current().display()))
        .title_bottom("Enter: Open | Backspace: Up | s: Select | Esc: Cancel")
        .border_style(Style::default().fg(Color::Yellow));

    if let Some(error) = picker.error() {
        let msg = Paragraph::new(error)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = picker
        .entries()
        .iter()
        .map(|name| ListItem::new(format!("{}{}", name, std::path::MAIN_SEPARATOR)))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    let mut state = ListState::default().with_selected(picker.selected());
    f.render_stateful_widget(list, area, &mut state);
}

/// A rectangle `percent_x` wide and `height` rows tall, centered in `area`.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(ui: &mut Ui, text: &str) {
        for c in text.chars() {
            ui.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_keys_build_an_instruction() {
        let mut ui = prepare(None, None, true).unwrap();
        type_text(&mut ui, "John");
        ui.handle_key(press(KeyCode::Tab));
        type_text(&mut ui, "Jane");
        ui.handle_key(press(KeyCode::Enter));

        assert_eq!(ui.form.instructions().len(), 1);
        assert_eq!(ui.form.instructions()[0].find, "John");
        assert_eq!(ui.form.instructions()[0].replace, "Jane");
        assert_eq!(ui.form.focus(), Focus::Find);
    }

    #[test]
    fn test_modified_characters_are_not_typed() {
        let mut ui = prepare(None, None, true).unwrap();
        ui.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        ui.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT));
        ui.handle_key(KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT));

        assert_eq!(ui.form.find_input, "C");
    }

    #[test]
    fn test_dialog_swallows_keys_until_dismissed() {
        let mut ui = prepare(None, None, true).unwrap();
        ui.handle_key(press(KeyCode::F(5)));
        assert!(ui.form.dialog().is_some());

        assert!(!ui.handle_key(press(KeyCode::Char('x'))));
        assert!(ui.form.find_input.is_empty());
        ui.handle_key(press(KeyCode::Enter));
        assert!(ui.form.dialog().is_none());
        assert!(ui.handle_key(press(KeyCode::Esc)));
    }

    #[test]
    fn test_picker_select_and_cancel() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("Smith")).unwrap();

        let mut ui = prepare(Some(temp_dir.path().to_path_buf()), None, true).unwrap();
        ui.handle_key(press(KeyCode::F(2)));
        assert_eq!(ui.picker.as_ref().unwrap().current(), temp_dir.path());

        ui.handle_key(press(KeyCode::Enter));
        ui.handle_key(press(KeyCode::Char('s')));
        assert!(ui.picker.is_none());
        assert_eq!(ui.form.source_folder(), Some(temp_dir.path().join("Smith").as_path()));

        ui.handle_key(press(KeyCode::F(2)));
        ui.handle_key(press(KeyCode::Esc));
        assert!(ui.picker.is_none());
        assert!(ui.form.source_folder().is_none());
    }

    #[test]
    fn test_prepare_loads_batch_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("batch.yaml"),
            "prefixes: [RLT]\ninstructions:\n  - find: A\n    replace: B\n",
        )
        .unwrap();

        let ui = prepare(
            Some(temp_dir.path().to_path_buf()),
            Some(PathBuf::from("batch.yaml")),
            true,
        )
        .unwrap();
        assert_eq!(ui.form.instructions().len(), 1);
        assert_eq!(ui.engine.whitelist().prefixes(), ["RLT"]);
    }

    #[test]
    fn test_centered_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 10);
        let rect = centered(area, 60, 20);
        assert_eq!(rect, Rect::new(20, 0, 60, 10));
    }
}
