use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, terminal,
};
use remtask::{CommandVector, TaskConfig, TaskManager};

const HELP: &str = "\
Commands:
  run <host> <cmd...>          run and wait, output is printed live
  start <host> <cmd...>        start in the background, prints the task id
  wait <id|all>                wait for a started task (or every running task)
  status <id>                  show task status
  output <id>                  show captured output of a finished task
  list                         list tasks
  send <host> <local> [remote] copy a file to a host
  get <host> <remote> [local]  copy a file from a host
  mv <src> <dst>               move a file on this machine
  help                         show this help
  exit                         quit
Use 'local' as the host to run on this machine.";

pub fn run_cli(manager: &mut TaskManager) -> io::Result<()> {
    println!("remtask shell. Enter a command, 'help' or 'exit'.");
    let mut history: Vec<String> = Vec::new();

    while let Some(input) = read_line(&history)? {
        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }
        history.push(input.clone());

        let Some(words) = shlex::split(&input) else {
            println!("Unbalanced quotes.");
            continue;
        };
        manager.poll_all();
        if !execute_line(manager, &words) {
            println!("Exiting.");
            break;
        }
    }
    Ok(())
}

/// Runs one shell command. Returns `false` when the shell should exit.
fn execute_line(manager: &mut TaskManager, words: &[String]) -> bool {
    let args: Vec<&str> = words.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["run", host, command @ ..] => {
            if let Some(id) = create(manager, host, command) {
                report_exit(id, manager.run_task(id));
            }
        }
        ["start", host, command @ ..] => {
            if let Some(id) = create(manager, host, command) {
                match manager.start_task(id) {
                    Ok(()) => println!("Started task {}. Use `wait {}` to collect it.", id, id),
                    Err(e) => println!("Task {}: {}", id, e),
                }
            }
        }
        ["wait", "all"] => {
            for (id, result) in manager.wait_running() {
                report_exit(id, result);
            }
        }
        ["wait", id] => {
            if let Some(id) = parse_id(id) {
                report_exit(id, manager.wait_task(id));
            }
        }
        ["status", id] => {
            if let Some(id) = parse_id(id) {
                match manager.task_status(id) {
                    Some(status) => println!("Task {} status: {}", id, status),
                    None => println!("Task {} not found", id),
                }
            }
        }
        ["output", id] => {
            if let Some(id) = parse_id(id) {
                match manager.task(id).map(|task| task.output()) {
                    Some(Ok(output)) => {
                        for message in &output.transcript {
                            print!("[{}] {}", message.stream, message.text());
                        }
                        io::stdout().flush().ok();
                    }
                    Some(Err(e)) => println!("Task {}: {}", id, e),
                    None => println!("Task {} not found", id),
                }
            }
        }
        ["list"] => list(manager),
        ["send", host, local, rest @ ..] if rest.len() <= 1 => {
            let task = manager
                .host(host)
                .send_file(local, rest.first().copied(), TaskConfig::default());
            run_now(manager, task);
        }
        ["get", host, remote, rest @ ..] if rest.len() <= 1 => {
            let task = manager
                .host(host)
                .get_file(remote, rest.first().copied(), TaskConfig::default());
            run_now(manager, task);
        }
        ["mv", source, destination] => {
            let task = manager
                .host(remtask::manager::LOCAL)
                .move_file(source, destination, TaskConfig::default());
            run_now(manager, task);
        }
        ["help"] => println!("{}", HELP),
        ["exit"] | ["quit"] => return false,
        [command, ..] => println!("Unknown or incomplete command: {}. Try 'help'.", command),
        [] => {}
    }
    true
}

fn create(manager: &mut TaskManager, host: &str, command: &[&str]) -> Option<u64> {
    let command = match CommandVector::new(command.iter().copied()) {
        Ok(command) => command,
        Err(e) => {
            println!("{}", e);
            return None;
        }
    };
    match manager.create_task(host, command, TaskConfig::default()) {
        Ok(id) => Some(id),
        Err(e) => {
            println!("{}", e);
            None
        }
    }
}

fn run_now(manager: &mut TaskManager, task: remtask::Result<remtask::Task>) {
    match task {
        Ok(task) => {
            let id = manager.add_task(task);
            report_exit(id, manager.run_task(id));
        }
        Err(e) => println!("{}", e),
    }
}

fn report_exit(id: u64, result: remtask::Result<i32>) {
    match result {
        Ok(code) => println!("Task {} exited with {}", id, code),
        Err(e) => println!("Task {}: {}", id, e),
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    let id = raw.parse::<u64>().ok();
    if id.is_none() {
        println!("Invalid task ID format.");
    }
    id
}

const LIST_HEADER: &str = "ID\tStatus                \tCommand";

fn list(manager: &TaskManager) {
    let mut tasks = manager.tasks().peekable();
    if tasks.peek().is_none() {
        println!("No tasks");
        return;
    }
    println!("{}", LIST_HEADER);
    println!("{}", "-".repeat(60));
    for (id, task) in tasks {
        println!("{}\t{:<22}\t{}", id, task.status().to_string(), task.label());
    }
}

/// Reads one line in raw mode with Up/Down history. Raw mode is left before
/// returning so task output printed afterwards renders normally.
/// Returns `None` on Ctrl-C, Ctrl-D or Esc.
fn read_line(history: &[String]) -> io::Result<Option<String>> {
    terminal::enable_raw_mode()?;
    let line = read_line_raw(history);
    terminal::disable_raw_mode()?;
    println!();
    line
}

fn read_line_raw(history: &[String]) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    let mut input = String::new();
    let mut history_index = history.len();

    print!("\r>>> ");
    stdout.flush()?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(Some(input)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') | KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Ok(None)
            }
            KeyCode::Up => {
                if history_index > 0 {
                    history_index -= 1;
                    input = history[history_index].clone();
                }
            }
            KeyCode::Down => {
                if history_index < history.len() {
                    history_index += 1;
                }
                input = history.get(history_index).cloned().unwrap_or_default();
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            _ => continue,
        }
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(terminal::ClearType::CurrentLine)
        )?;
        print!(">>> {}", input);
        stdout.flush()?;
    }
}
