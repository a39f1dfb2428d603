use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use thompson::pipeline::{read_patterns, run_batch, PatternReport};
use thompson::prelude::*;

use tracing::{debug, error, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgAction, ArgMatches, Command};

fn cli() -> clap::Command {
    Command::new("rexc")
        .about("Compiles regular expressions into NFAs, DFAs and minimal DFAs")
        .arg(
            Arg::new("patterns")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("file containing one regular expression per line"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("string that is simulated on every compiled pattern"),
        )
        .arg(
            Arg::new("render")
                .short('r')
                .long("render")
                .value_parser(clap::value_parser!(PathBuf))
                .help("directory into which the automata are rendered as PNG images"),
        )
        .arg(
            Arg::new("tables")
                .short('t')
                .long("tables")
                .action(ArgAction::SetTrue)
                .help("print the transition tables of all automata"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let Ok(Some(verbosity)) = matches.try_get_one::<String>("verbosity") else {
        return;
    };

    let level = match verbosity.as_str() {
        "trace" => filter::LevelFilter::TRACE,
        "debug" => filter::LevelFilter::DEBUG,
        _ => filter::LevelFilter::INFO,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn verdict(accepted: bool) -> String {
    if accepted {
        "accepted".green().to_string()
    } else {
        "rejected".red().to_string()
    }
}

#[cfg(feature = "graphviz")]
fn render(directory: &Path, name: &str, automaton: &impl Dottable) {
    let target = directory.join(format!("{name}.png"));
    match automaton.render_to_file_name(&target) {
        Ok(()) => info!("rendered {}", target.display()),
        Err(e) => error!("could not render {}: {e}", target.display()),
    }
}

#[cfg(not(feature = "graphviz"))]
fn render(_directory: &Path, name: &str, _automaton: &impl Dottable) {
    error!("cannot render {name}, rexc was built without the graphviz feature");
}

fn print_report(report: &PatternReport, input: Option<&str>, matches: &ArgMatches) {
    let PatternReport {
        index,
        pattern,
        outcome,
        verdicts,
    } = report;

    println!("{} {}", format!("[{index}]").bold(), pattern.bold());
    let compiled = match outcome {
        Ok(compiled) => compiled,
        Err(e) => {
            println!("  {} {e}", "error:".red().bold());
            return;
        }
    };

    println!("  postfix   {}", compiled.postfix);
    println!(
        "  states    NFA {}, DFA {}, minimized {}",
        compiled.nfa.size(),
        compiled.dfa.size(),
        compiled.minimal.size()
    );

    if matches.get_flag("tables") {
        println!("NFA\n{}", compiled.nfa.show());
        println!("DFA\n{}", compiled.dfa.show());
        println!("Minimized DFA\n{}", compiled.minimal.show());
    }

    if let Some(directory) = matches.get_one::<PathBuf>("render") {
        render(directory, &format!("afn_{index}"), &compiled.nfa);
        render(directory, &format!("afd_{index}"), &compiled.dfa);
        render(directory, &format!("afd_{index}_minimizado"), &compiled.minimal);
    }

    if let (Some(input), Some(verdicts)) = (input, verdicts) {
        println!("  \"{input}\" is");
        println!("    {} by the NFA", verdict(verdicts.nfa));
        println!("    {} by the DFA", verdict(verdicts.dfa));
        println!("    {} by the minimized DFA", verdict(verdicts.minimized));
        if !verdicts.consistent() {
            error!("the automata for pattern {index} disagree on \"{input}\"");
        }
    }
}

pub fn main() {
    let matches = cli().get_matches();

    setup_logging(&matches);

    let Some(path) = matches.get_one::<PathBuf>("patterns") else {
        unreachable!("the pattern file is a required argument")
    };
    let patterns = match std::fs::File::open(path)
        .and_then(|file| read_patterns(std::io::BufReader::new(file)))
    {
        Ok(patterns) => patterns,
        Err(e) => {
            eprintln!("cannot read patterns from {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    debug!("read {} patterns from {}", patterns.len(), path.display());

    if let Some(directory) = matches.get_one::<PathBuf>("render") {
        if let Err(e) = std::fs::create_dir_all(directory) {
            eprintln!("cannot create {}: {e}", directory.display());
            std::process::exit(1);
        }
    }

    let input = matches.get_one::<String>("input").map(String::as_str);
    let reports = run_batch(&patterns, input);
    for report in &reports {
        print_report(report, input, &matches);
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    info!(
        "compiled {} of {} patterns",
        reports.len() - failed,
        reports.len()
    );
}
