//! Interactive chat session

use crate::app::ChatArgs;
use crate::output;
use anyhow::Result;
use savollar_core::{Database, Message};
use std::io::{BufRead, Write};

pub async fn run(args: ChatArgs, db: Database) -> Result<()> {
    let (orchestrator, db) = super::build_orchestrator(db)?;
    let mut history: Vec<Message> = Vec::new();

    println!("Savollar chat. Chiqish uchun bo'sh qator yoki \"exit\".");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let message = line.trim().to_string();
        if message.is_empty() || message == "exit" || message == "quit" {
            break;
        }

        match orchestrator.chat_with_trace(&message, &history).await {
            Ok(trace) => {
                super::log_exchange(&db, args.session.as_deref(), &message, &trace);
                output::print_answer(&trace.result, crate::app::OutputFormat::Cli)?;
                println!();

                history.push(Message::user(&message));
                history.push(Message::assistant(&trace.result.answer_text));
            }
            Err(e) => {
                eprintln!("Xatolik: {}", e);
            }
        }
    }

    Ok(())
}
