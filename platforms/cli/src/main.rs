use clap::Parser;
use dtm::types::DEFAULT_TRACE_WIDTH;
use dtm::{
    analyze, Definition, Halt, MachineLoader, MachineManager, Observer, Step, Trace,
    TuringMachine, MAX_EXECUTION_STEPS,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::error::Error;
use std::io::{self, Read};
use std::path::Path;

/// Runs a deterministic single-tape Turing machine.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  dtm machines/busy-beaver-2.tm --verbose
  dtm --machine \"Binary Increment\" --tape 1,1,1
  dtm machines/
  dtm --list beaver
  cat machine.json | dtm --json")]
struct Cli {
    /// Path to a machine definition (.tm or .json), or a directory of them.
    /// If not provided, the definition is read from stdin.
    program: Option<String>,

    /// Run a built-in machine by name
    #[clap(short, long, conflicts_with = "program")]
    machine: Option<String>,

    /// List the built-in machines whose name contains QUERY (all if omitted) and exit
    #[clap(short, long, value_name = "QUERY", num_args = 0..=1, default_missing_value = "")]
    list: Option<String>,

    /// Print the source of a built-in machine and exit
    #[clap(long, value_name = "NAME")]
    show: Option<String>,

    /// Maximum number of steps to execute
    #[clap(short = 'n', long, default_value_t = MAX_EXECUTION_STEPS)]
    max_iter: usize,

    /// Print each step of the execution
    #[clap(short, long)]
    verbose: bool,

    /// Trace width in columns (defaults to the terminal width)
    #[clap(short, long)]
    width: Option<usize>,

    /// Replace the initial tape with comma-separated symbols
    #[clap(short, long, value_delimiter = ',')]
    tape: Option<Vec<String>>,

    /// Override the starting head position
    #[clap(long, allow_hyphen_values = true)]
    head: Option<i64>,

    /// Print the final configuration as JSON
    #[clap(long)]
    json: bool,
}

/// Shows a progress bar on stderr while a machine runs without a trace.
struct Progress {
    bar: ProgressBar,
}

impl Progress {
    fn new(max_iter: usize) -> Self {
        let bar = ProgressBar::new(max_iter as u64);
        if atty::isnt(atty::Stream::Stderr) {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} steps")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        Self { bar }
    }
}

impl Observer for Progress {
    fn on_step(&mut self, _machine: &TuringMachine) {
        self.bar.inc(1);
    }

    fn on_halt(&mut self, _machine: &TuringMachine, _halt: Halt) {
        self.bar.finish_and_clear();
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(query) = &cli.list {
        return list_machines(query);
    }

    if let Some(name) = &cli.show {
        return show_machine(name);
    }

    if let Some(path) = cli.program.as_deref().map(Path::new) {
        if path.is_dir() {
            return run_dir(&cli, path);
        }
    }

    let definition = load_definition(&cli)?;
    execute(&cli, definition)
}

/// Runs every definition in `directory`, reporting each in turn.
///
/// Definitions that fail to load are reported and skipped; the run fails if any did.
fn run_dir(cli: &Cli, directory: &Path) -> Result<(), Box<dyn Error>> {
    let mut failures = 0;

    for result in MachineLoader::load_dir(directory) {
        match result {
            Ok((path, definition)) => {
                println!("== {} ==", path.display());
                if let Err(e) = execute(cli, definition) {
                    eprintln!("Error: {}", e);
                    failures += 1;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} machine(s) in {} failed", failures, directory.display()).into());
    }

    Ok(())
}

/// Applies the CLI overrides to `definition`, then runs and reports it.
fn execute(cli: &Cli, mut definition: Definition) -> Result<(), Box<dyn Error>> {
    if let Some(tape) = &cli.tape {
        definition.initial_tape = tape.clone();
    }
    if let Some(head) = cli.head {
        definition.head = head;
    }

    for diagnostic in analyze(&definition) {
        log::warn!("{}", diagnostic);
    }

    let mut machine = TuringMachine::new(definition)?;

    let step = if cli.verbose {
        let width = cli.width.unwrap_or_else(terminal_width);
        let mut trace = Trace::new(io::stdout().lock(), width);
        let step = machine.run_with(cli.max_iter, &mut trace);
        trace.finish()?;
        step
    } else {
        let mut progress = Progress::new(cli.max_iter);
        let step = machine.run_with(cli.max_iter, &mut progress);
        progress.bar.finish_and_clear();
        step
    };

    report(&machine, step, cli.json)
}

/// Loads the definition named by the CLI arguments.
///
/// It tries a built-in machine, then a file path, and finally stdin.
fn load_definition(cli: &Cli) -> Result<Definition, Box<dyn Error>> {
    if let Some(name) = &cli.machine {
        return Ok(MachineManager::get_by_name(name)?);
    }

    if let Some(path) = &cli.program {
        return Ok(MachineLoader::load(Path::new(path))?);
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;

        let definition = if buffer.trim_start().starts_with('{') {
            MachineLoader::load_json_from_string(&buffer)?
        } else {
            MachineLoader::load_from_string(&buffer)?
        };
        return Ok(definition);
    }

    Err("no machine given: pass a definition file, --machine NAME, or pipe one on stdin".into())
}

fn list_machines(query: &str) -> Result<(), Box<dyn Error>> {
    for index in MachineManager::search(query) {
        let info = MachineManager::info(index)?;
        println!(
            "{:>2}. {} ({} states, {} symbols, {} transitions, starts in {})",
            info.index,
            info.name,
            info.state_count,
            info.symbol_count,
            info.transition_count,
            info.initial_state
        );
    }

    Ok(())
}

fn show_machine(name: &str) -> Result<(), Box<dyn Error>> {
    let index = MachineManager::names()
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("Machine '{}' not found", name))?;

    print!("{}", MachineManager::text_by_index(index)?);
    Ok(())
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(columns, _)| columns as usize)
        .unwrap_or(DEFAULT_TRACE_WIDTH)
}

fn report(machine: &TuringMachine, step: Step, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&machine.snapshot())?);
        return Ok(());
    }

    match step {
        Step::Continue => println!(
            "Stopped after {} steps without halting, in state {}.",
            machine.step_count(),
            machine.state()
        ),
        Step::Halt(Halt::Final) => println!(
            "Halted in final state {} after {} steps.",
            machine.state(),
            machine.step_count()
        ),
        Step::Halt(Halt::Undefined) => println!(
            "Halted after {} steps: no transition for state {} reading '{}'.",
            machine.step_count(),
            machine.state(),
            machine.symbol()
        ),
        Step::Halt(Halt::TapeLimit) => println!(
            "Halted after {} steps: head at {} cannot move further in state {}.",
            machine.step_count(),
            machine.head(),
            machine.state()
        ),
    }

    let view = machine.tape().contents();
    let separator = if view.symbols.iter().all(|s| s.chars().count() == 1) {
        ""
    } else {
        " "
    };
    println!("Head: {}", machine.head());
    println!("Tape from {}: {}", view.start, view.symbols.join(separator));

    Ok(())
}
