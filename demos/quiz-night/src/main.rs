//! Quiz-night: a runnable Quizcast server with a built-in question set.
//!
//! Process configuration comes from the environment:
//!
//! - `QUIZ_ADDR`      — listen address (default `127.0.0.1:3000`)
//! - `QUIZ_GRACE_MS`  — reconnection grace window in ms (default 180000)
//! - `QUIZ_HOST_EXIT` — `close` (default) or `promote`
//! - `RUST_LOG`       — tracing filter (e.g. `quizcast_room=debug`)

use std::sync::Arc;
use std::time::Duration;

use quizcast_game::{Question, StaticBank};
use quizcast_room::{HostExitPolicy, RoomConfig};
use quizcast_server::QuizcastServerBuilder;

fn sample_bank() -> StaticBank {
    let mut bank = StaticBank::new();

    bank.add_game(
        "sepsis_rounds",
        vec![
            Question::TokenAssembly {
                case_text: "A 63-year-old arrives febrile and hypotensive \
                            after two days of cough."
                    .into(),
                prompt: "Assemble the first-hour bundle.".into(),
                tokens: vec![
                    "collect cultures".into(),
                    "broad-spectrum antibiotics".into(),
                    "crystalloid bolus".into(),
                    "immediate discharge".into(),
                    "wait for imaging".into(),
                ],
                answer_text: "Collect cultures, start broad-spectrum \
                              antibiotics and give a crystalloid bolus."
                    .into(),
            },
            Question::MultiSelect {
                case_text: "Same patient, one hour later: lactate is still \
                            rising."
                    .into(),
                prompt: "Which two findings define septic shock?".into(),
                options: vec![
                    "vasopressors required to keep MAP ≥ 65".into(),
                    "fever above 39 °C".into(),
                    "lactate above 2 mmol/L despite fluids".into(),
                    "positive blood cultures".into(),
                ],
                correct: vec![0, 2],
                select_count: 2,
            },
            Question::SingleChoice {
                prompt: "Best single marker to trend the response to \
                         resuscitation?"
                    .into(),
                choices: vec![
                    "white-cell count".into(),
                    "serum lactate".into(),
                    "CRP".into(),
                    "temperature".into(),
                ],
                correct: 1,
            },
        ],
    )
    .expect("built-in question set must validate");

    bank
}

fn config_from_env() -> (String, RoomConfig) {
    let addr = std::env::var("QUIZ_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let mut config = RoomConfig::default();
    if let Ok(ms) = std::env::var("QUIZ_GRACE_MS") {
        match ms.parse::<u64>() {
            Ok(ms) => config.grace_window = Duration::from_millis(ms),
            Err(_) => tracing::warn!(value = %ms, "ignoring bad QUIZ_GRACE_MS"),
        }
    }
    if let Ok(policy) = std::env::var("QUIZ_HOST_EXIT") {
        config.host_exit = match policy.as_str() {
            "promote" => HostExitPolicy::PromoteSuccessor,
            "close" => HostExitPolicy::CloseRoom,
            other => {
                tracing::warn!(value = %other, "ignoring bad QUIZ_HOST_EXIT");
                config.host_exit
            }
        };
    }

    (addr, config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let (addr, config) = config_from_env();
    tracing::info!(%addr, "starting quiz-night");

    let server = QuizcastServerBuilder::new()
        .bind(&addr)
        .room_config(config)
        .build(Arc::new(sample_bank()))
        .await?;

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_bank_registers_the_demo_game() {
        use quizcast_game::QuestionBank;

        let bank = sample_bank();
        assert_eq!(bank.game_types(), vec!["sepsis_rounds"]);
        assert_eq!(bank.load("sepsis_rounds").unwrap().len(), 3);
    }
}
