use services::{ActionError, AppServices, Clock};
use storage::repository::PageRequest;
use study_core::model::QuestionDraft;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

mod args;
mod confirm;
mod render;
mod runner;

use args::{Command, Invocation, QuestionInput};

fn init_tracing() {
    // stderr keeps the quiz screen on stdout readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

fn draft(input: QuestionInput) -> QuestionDraft {
    QuestionDraft {
        bank_id: input.bank_id,
        question_text: input.text,
        options: input.options,
        correct_indices: input.correct,
    }
}

async fn dispatch(app: &AppServices, invocation: Invocation) -> Result<(), Box<dyn std::error::Error>> {
    let Invocation { command, config } = invocation;
    match command {
        Command::Help => args::print_usage(),
        Command::Banks => {
            let banks = app.banks().list_banks().await?;
            print!("{}", render::bank_list(&banks));
        }
        Command::CreateBank { title } => {
            let bank = app.banks().create_bank(&title).await?;
            println!("Created bank #{}: {}", bank.id(), bank.title());
        }
        Command::RenameBank { bank_id, title } => {
            let bank = app.banks().rename_bank(bank_id, &title).await?;
            println!("Renamed bank #{} to {}", bank.id(), bank.title());
        }
        Command::DeleteBank { bank_id, confirmed } => {
            let bank = app
                .banks()
                .get_bank(bank_id)
                .await?
                .ok_or(ActionError::NotFound("bank"))?;
            if !confirmed {
                let count = app.questions().count_questions(bank_id).await?;
                let mut out = std::io::stdout();
                if !confirm::confirm_bank_delete(&bank, count, &mut stdin_lines(), &mut out).await? {
                    println!("Kept bank #{bank_id}");
                    return Ok(());
                }
            }
            app.banks().delete_bank(bank_id).await?;
            println!("Deleted bank #{bank_id} and all of its questions");
        }
        Command::Questions {
            bank_id,
            page,
            reveal,
        } => {
            let bank = app
                .banks()
                .get_bank(bank_id)
                .await?
                .ok_or(ActionError::NotFound("bank"))?;
            let listing = app
                .questions()
                .list_questions(bank_id, PageRequest::new(page, config.page_size))
                .await?;
            print!("{}", render::question_page(&bank, &listing, reveal));
        }
        Command::AddQuestion(input) => {
            let question = app.questions().create_question(draft(input)).await?;
            println!("{}", render::question_saved("Added", &question));
        }
        Command::EditQuestion { question_id, input } => {
            let question = app
                .questions()
                .update_question(question_id, draft(input))
                .await?;
            println!("{}", render::question_saved("Updated", &question));
        }
        Command::DeleteQuestion {
            bank_id,
            question_id,
            confirmed,
        } => {
            let question = app
                .questions()
                .get_question(question_id)
                .await?
                .ok_or(ActionError::NotFound("question"))?;
            // a bank mismatch is reported by delete_question without prompting
            if !confirmed && question.bank_id() == bank_id {
                let mut out = std::io::stdout();
                if !confirm::confirm_question_delete(&question, &mut stdin_lines(), &mut out).await? {
                    println!("Kept question #{question_id}");
                    return Ok(());
                }
            }
            app.questions().delete_question(question_id, bank_id).await?;
            println!("Deleted question #{question_id} from bank #{bank_id}");
        }
        Command::Quiz { bank_id } => {
            let mut out = std::io::stdout();
            runner::run_quiz(&app.quizzes(), bank_id, &mut stdin_lines(), &mut out).await?;
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let invocation = args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .map_err(|e| {
            eprintln!("{e}");
            args::print_usage();
            e
        })?;
    if invocation.command == Command::Help {
        args::print_usage();
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    args::prepare_sqlite_file(&invocation.config.db_url)?;
    let app = AppServices::new_sqlite(
        &invocation.config.db_url,
        Clock::system(),
        invocation.config.quiz,
    )
    .await?;

    dispatch(&app, invocation).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
