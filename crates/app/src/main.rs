use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use crossbeam_channel::Receiver;
use editor_core::Viewport;
use editor_state::{dispatch, DispatchOutcome, EngineEvent, Prompt, Redraw, Workspace};
use term::{input, prompt, render, Terminal};

/// A terminal-based multi-buffer text editor.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// File paths to open; a missing file yields a new, unsaved document
    /// bound to that path.
    files: Vec<String>,

    /// Read-only (LESS) mode: disable all mutating bindings, Esc quits.
    #[arg(short = 'v', long = "view")]
    view: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut workspace = Workspace::new();
    let mut load_failed = false;

    if args.files.is_empty() {
        if std::io::stdin().is_terminal() {
            workspace.create_document();
        } else if let Err(e) = workspace.open_from_stdin() {
            log::error!("failed to read stdin: {e}");
            load_failed = true;
        }
    } else {
        for path in &args.files {
            if let Err(e) = workspace.open(path) {
                log::error!("failed to open {path}: {e}");
                load_failed = true;
            }
        }
    }

    if workspace.is_empty() {
        if load_failed {
            return ExitCode::FAILURE;
        }
        workspace.create_document();
    }

    match run(workspace, args.view) {
        Ok(()) if load_failed => ExitCode::FAILURE,
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(mut workspace: Workspace, less_mode: bool) -> std::io::Result<()> {
    let mut term = Terminal::enter()?;
    let (cols, lines) = term.size()?;
    let mut viewport = Viewport { cols: cols as usize, lines: lines as usize };
    let events = input::spawn();

    render::paint(&mut term, &workspace, &viewport, Redraw::Full)?;

    for event in events.iter() {
        let outcome = dispatch(&mut workspace, event, &mut viewport, less_mode);

        match outcome {
            DispatchOutcome::Quit => break,
            DispatchOutcome::Handled(redraw) => {
                render::paint(&mut term, &workspace, &viewport, redraw)?;
            }
            DispatchOutcome::NeedsPrompt(prompt) => {
                if handle_prompt(&mut workspace, &mut term, &events, &viewport, prompt)? {
                    break;
                }
                render::paint(&mut term, &workspace, &viewport, Redraw::Full)?;
            }
        }
    }

    Ok(())
}

/// Collects whatever value a `Prompt` variant needs (a status-bar line, or
/// a y/n confirmation) and carries out the operation it gates. Returns
/// `true` if the editor should quit.
fn handle_prompt(
    workspace: &mut Workspace,
    term: &mut Terminal,
    events: &Receiver<EngineEvent>,
    viewport: &Viewport,
    which: Prompt,
) -> std::io::Result<bool> {
    match which {
        Prompt::Find => {
            if let Some(needle) = prompt::read_line(term, events, viewport, "Find: ")? {
                if !needle.is_empty() {
                    match workspace.find_text(Some(needle.as_bytes()), viewport) {
                        Ok(true) => {}
                        Ok(false) => workspace.set_status("search: no match"),
                        Err(e) => workspace.set_status(e.to_string()),
                    }
                }
            }
        }
        Prompt::GotoLine => {
            if let Some(text) = prompt::read_line(term, events, viewport, "Go to line: ")? {
                match text.trim().parse::<usize>() {
                    Ok(n) if n > 0 => {
                        if let Some(doc) = workspace.current_mut() {
                            doc.goto_line(n - 1, viewport);
                        }
                    }
                    _ => workspace.set_status("goto-line: not a valid line number"),
                }
            }
        }
        Prompt::OpenFile => {
            if let Some(path) = prompt::read_line(term, events, viewport, "Open file: ")? {
                if !path.is_empty() {
                    if let Err(e) = workspace.open(&path) {
                        workspace.set_status(e.to_string());
                    }
                }
            }
        }
        Prompt::SaveAs => {
            if let Some(path) = prompt::read_line(term, events, viewport, "Save as: ")? {
                if !path.is_empty() {
                    if let Some(doc) = workspace.current_mut() {
                        doc.set_filename(path);
                        if let Err(e) = doc.save() {
                            workspace.set_status(e.to_string());
                        }
                    }
                }
            }
        }
        Prompt::ShellCommand => {
            if let Some(cmd) = prompt::read_line(term, events, viewport, "Pipe through: ")? {
                if !cmd.is_empty() {
                    if let Some(doc) = workspace.current_mut() {
                        if let Err(e) = doc.pipe_command(&cmd, viewport) {
                            workspace.set_status(e.to_string());
                        }
                    }
                }
            }
        }
        Prompt::ConfirmQuit => {
            let label = "Unsaved changes, quit anyway? (y/n) ";
            if prompt::read_confirm(term, events, viewport, label)? {
                return Ok(true);
            }
        }
        Prompt::ConfirmCloseDirty => {
            let label = "Unsaved changes, close anyway? (y/n) ";
            if prompt::read_confirm(term, events, viewport, label)? {
                workspace.close_current();
            }
        }
    }

    Ok(false)
}
