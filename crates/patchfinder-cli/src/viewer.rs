use std::io;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use patchfinder_core::{DeviceTarget, DeviceTransport, Poller, SwitchReport};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Terminal;

use crate::render::{format_percentage, lowest_usage_line};

#[derive(Default)]
struct ViewerState {
    latest: Option<SwitchReport>,
    last_error: Option<String>,
    polled_at: Option<DateTime<Local>>,
    polling: bool,
}

impl ViewerState {
    fn update(&mut self, result: Result<SwitchReport, String>) {
        match result {
            Ok(report) => {
                self.latest = Some(report);
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err),
        }
        self.polled_at = Some(Local::now());
        self.polling = false;
    }
}

pub async fn run_viewer<D: DeviceTransport>(poller: &mut Poller<D>, target: &DeviceTarget) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = ViewerState {
        polling: true,
        ..ViewerState::default()
    };

    let run_result = async {
        loop {
            terminal.draw(|frame| draw_ui(frame.size(), frame, &state, &target.host))?;

            if state.polling {
                let result = poller.poll(target).await.map_err(|err| err.to_string());
                state.update(result);
                continue;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('r') => state.polling = true,
                        _ => {}
                    }
                }
            }
        }

        Ok::<(), anyhow::Error>(())
    }
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

fn draw_ui(area: Rect, frame: &mut ratatui::Frame<'_>, state: &ViewerState, host: &str) {
    let poe_height = state
        .latest
        .as_ref()
        .and_then(|r| r.poe_status.as_ref())
        .map(|rows| rows.len() as u16 + 3)
        .unwrap_or(3);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(poe_height),
            Constraint::Length(3),
        ])
        .split(area);

    frame.render_widget(render_header(state, host), rows[0]);

    match &state.latest {
        Some(report) => {
            frame.render_widget(render_ports(report), rows[1]);
            frame.render_widget(render_poe(report), rows[2]);
            frame.render_widget(
                Paragraph::new(Line::from(lowest_usage_line(report)))
                    .block(Block::default().borders(Borders::ALL).title("Least used")),
                rows[3],
            );
        }
        None => {
            let waiting = Paragraph::new(Line::from("Waiting for first poll..."))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(waiting, rows[1]);
        }
    }
}

fn render_header(state: &ViewerState, host: &str) -> Paragraph<'static> {
    let mut lines = Vec::new();
    let title = match &state.latest {
        Some(report) => format!("{} ({})  uptime {}", report.hostname, host, report.uptime),
        None => host.to_string(),
    };
    lines.push(Line::from(vec![
        Span::styled("PatchFinder  ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(title),
    ]));

    let status = if state.polling {
        "polling...".to_string()
    } else {
        let at = state
            .polled_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        format!("last poll {at}  (press 'r' to re-poll, 'q' to quit)")
    };
    lines.push(Line::from(status));

    if let Some(err) = &state.last_error {
        lines.push(Line::from(Span::styled(
            format!("poll failed: {err}"),
            Style::default().fg(Color::Red),
        )));
    }

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Switch"))
}

fn render_ports(report: &SwitchReport) -> Table<'static> {
    let header = Row::new(["Port", "Description", "VLAN", "Last Input", "In", "Out", "Use (%)"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = report
        .disconnected_ports
        .iter()
        .map(|port| {
            let usage = match port.usage_percentage {
                Some(p) if p == 0.0 => {
                    Cell::from(format_percentage(p)).style(Style::default().fg(Color::Green))
                }
                Some(p) => Cell::from(format_percentage(p)),
                None => Cell::from("-").style(Style::default().fg(Color::DarkGray)),
            };
            Row::new(vec![
                Cell::from(port.port.clone()),
                Cell::from(port.description.clone().unwrap_or_default()),
                Cell::from(port.vlan.clone().unwrap_or_default()),
                Cell::from(port.last_input.clone()),
                Cell::from(port.input_packets.clone()),
                Cell::from(port.output_packets.clone()),
                usage,
            ])
        })
        .collect();

    let title = format!("Not-connect Switchports ({})", report.disconnected_ports.len());
    Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Min(18),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
}

fn render_poe(report: &SwitchReport) -> Table<'static> {
    let header = Row::new(["Switch No.", "Available", "Used", "Free"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = report
        .poe_status
        .iter()
        .flatten()
        .map(|row| {
            let free = if row.exhausted {
                Cell::from(row.free.clone()).style(Style::default().fg(Color::Red))
            } else {
                Cell::from(row.free.clone())
            };
            Row::new(vec![
                Cell::from(row.switch_no.clone()),
                Cell::from(row.available.clone()),
                Cell::from(row.used.clone()),
                free,
            ])
        })
        .collect();

    let title = if report.poe_status.is_some() {
        "PoE Details"
    } else {
        "PoE Details (unavailable)"
    };
    Table::new(rows, [Constraint::Length(14); 4])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
}
