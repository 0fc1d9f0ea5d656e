use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use wordquiz_core::logging::init_tracing;
use wordquiz_core::{QuizApp, QuizConfig, QuizMode, DEFAULT_CONFIG_PATH, QUIZ_LENGTH};

#[derive(Parser)]
#[command(name = "wordquiz", about = "Ten-question vocabulary quiz")]
struct Cli {
    /// TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one quiz in the terminal
    Play {
        /// normal or weak
        #[arg(short, long, default_value = "normal")]
        mode: String,
        #[arg(long, default_value = "local")]
        session: String,
    },
    /// Show past scores
    History,
    /// Print "ok" if the catalog loads
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = QuizConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    init_tracing(&config.log_level);

    let mut app = QuizApp::from_config(config).context("failed to start quiz")?;

    match cli.command {
        Command::Play { mode, session } => {
            let mode: QuizMode = mode.parse()?;
            play(&mut app, &session, mode)
        }
        Command::History => {
            print_history(&app);
            Ok(())
        }
        Command::Health => {
            println!("{}", app.health());
            Ok(())
        }
    }
}

fn play(app: &mut QuizApp, session_id: &str, mode: QuizMode) -> Result<()> {
    app.start_quiz(session_id, mode)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let question = app.current_question(session_id)?;
        println!("\n[{}/{}] {}", question.number(), QUIZ_LENGTH, question.prompt);
        for (i, option) in question.choices.options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
        print!("> ");
        io::stdout().flush()?;

        let line = lines.next().transpose()?.unwrap_or_default();
        // A number picks an option; anything else is taken as a typed answer
        let selected = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| question.choices.options.get(i).cloned())
            .unwrap_or_else(|| line.trim().to_string());

        let outcome = app.submit_answer(session_id, &selected)?;
        if outcome.correct {
            println!("正解!");
        } else {
            println!("不正解: {}", outcome.correct_answer);
        }
        if outcome.finished {
            break;
        }
    }

    let report = app.finish_quiz(session_id)?;
    println!("\nScore: {}/{}", report.score, report.total);
    for wrong in &report.wrong_answers {
        println!("  {} -> {} (you: {})", wrong.prompt, wrong.correct_answer, wrong.user_answer);
    }
    if let Some(chart) = &report.chart_path {
        println!("Chart: {}", chart.display());
    }
    for badge in &report.new_badges {
        println!("New badge: {} [{}]", badge.name, badge.rank.as_str());
    }
    Ok(())
}

fn print_history(app: &QuizApp) {
    for record in app.history() {
        println!("{}  {:<6}  {}", record.date.format("%Y-%m-%d %H:%M"), record.mode.as_str(), record.score);
    }
    let summary = app.history_summary();
    println!(
        "sessions: {}  average: {:.1}  best: {}  accuracy: {:.1}%",
        summary.total_sessions, summary.average_score, summary.best_score, summary.accuracy_percent
    );
    let badges: Vec<String> = app.earned_badges().into_iter().map(|b| b.name).collect();
    if !badges.is_empty() {
        println!("badges: {}", badges.join(", "));
    }
}
