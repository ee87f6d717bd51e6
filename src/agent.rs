use anyhow::Result;
use colored::*;
use std::io::{self, Write};

use crate::client::ModelClient;
use crate::config::AgentConfig;
use crate::display::{
    display_command_output, display_error, display_feedback_response, display_info,
    display_pending_command, display_verbose, display_warning, thinking_spinner,
};
use crate::executor::{ExecutionResult, ShellExecutor};
use crate::extractor::CommandExtractor;
use crate::history::{Conversation, Role};
use crate::queue::CommandQueue;

/// Per-command yes/no decision point. Injected so interactive prompting can
/// be swapped for a scripted gate in tests.
pub trait ConfirmationGate: Send + Sync {
    fn confirm(&self, command: &str, needs_feedback: bool) -> bool;
}

/// Blocking stdin prompt, one question per pending command
pub struct ConsoleGate;

impl ConfirmationGate for ConsoleGate {
    fn confirm(&self, _command: &str, _needs_feedback: bool) -> bool {
        print!("{} ", "Execute this command? (y/n):".bold());
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        input.trim().eq_ignore_ascii_case("y")
    }
}

/// The terminal command agent.
///
/// Owns the conversation log for the session and drives one query at a
/// time through the extract / confirm / execute / feedback loop. The
/// command queue and its cursor are locals of a single `run` call, so a
/// run can never be re-entered or observed mid-loop.
pub struct CmdAgent {
    config: AgentConfig,
    client: Box<dyn ModelClient>,
    gate: Box<dyn ConfirmationGate>,
    extractor: CommandExtractor,
    executor: ShellExecutor,
    conversation: Conversation,
}

impl CmdAgent {
    pub fn new(
        config: AgentConfig,
        client: Box<dyn ModelClient>,
        gate: Box<dyn ConfirmationGate>,
    ) -> Self {
        Self {
            config,
            client,
            gate,
            extractor: CommandExtractor::new(),
            executor: ShellExecutor::new(),
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    pub fn load_conversation(&mut self, path: &std::path::Path) -> Result<()> {
        self.conversation = Conversation::load_from(path)?;
        Ok(())
    }

    pub fn save_conversation(&self, path: &std::path::Path) -> Result<()> {
        self.conversation.save_to(path)
    }

    /// Ask the model, then walk the extracted command queue. Returns the
    /// model's initial response regardless of how many feedback rounds
    /// followed it.
    pub async fn run(&mut self, query: &str, stream: bool, execute: bool) -> Result<String> {
        display_verbose(
            self.config.verbose,
            &format!("history has {} entries", self.conversation.len()),
        );

        let spinner = thinking_spinner();
        let response = self.client.send(query, &self.conversation, stream).await;
        spinner.finish_and_clear();
        let response = response?;

        self.conversation.append(Role::User, query);
        self.conversation.append(Role::Assistant, response.clone());

        println!("\n{}", response);

        if execute {
            self.process_commands(&response, stream).await;
        }

        Ok(response)
    }

    /// Drive the queue: confirm, execute, log, and splice in commands
    /// discovered through feedback. The cursor advances on every iteration,
    /// and splices only land behind it, so the loop always terminates once
    /// the model stops suggesting new commands.
    async fn process_commands(&mut self, response: &str, stream: bool) {
        let mut queue = CommandQueue::new(self.extractor.extract(response));

        display_verbose(
            self.config.verbose,
            &format!("extracted {} command(s) from response", queue.len()),
        );
        if queue.is_empty() {
            return;
        }
        display_verbose(
            self.config.verbose,
            &format!("working directory: {}", self.executor.working_dir().display()),
        );

        while let Some(item) = queue.current().cloned() {
            let (position, total) = queue.position();
            display_verbose(
                self.config.verbose,
                &format!("processing command {}/{}", position + 1, total),
            );
            display_pending_command(&item.text, item.requires_feedback);

            if !self.gate.confirm(&item.text, item.requires_feedback) {
                display_info("Command execution skipped.");
                self.conversation
                    .append(Role::System, "Command execution skipped by user.");
                queue.advance();
                continue;
            }

            println!("\nExecuting command...");
            let result = self.executor.execute(&item.text).await;
            display_command_output(&result.output);

            let result_content = format_result_entry(&result);
            self.conversation.append(Role::System, result_content.clone());

            if item.requires_feedback {
                self.feedback_round(&result_content, stream, &mut queue).await;
            }

            queue.advance();
        }

        debug_assert!(queue.is_exhausted());
    }

    /// Send an execution result back to the model and splice any newly
    /// suggested commands in right after the current queue position. A
    /// model failure here is reported and logged but never stops the queue.
    async fn feedback_round(&mut self, result_content: &str, stream: bool, queue: &mut CommandQueue) {
        println!("\nSending command output back to model for analysis...");

        let feedback_query = format!(
            "I executed the command and got the following result:\n\n{}\n\n\
             Please analyze this output and provide further guidance or commands if needed.",
            result_content
        );

        let spinner = thinking_spinner();
        let reply = self
            .client
            .send(&feedback_query, &self.conversation, stream)
            .await;
        spinner.finish_and_clear();

        match reply {
            Ok(feedback) => {
                self.conversation.append(Role::Assistant, feedback.clone());
                display_feedback_response(&feedback);

                let new_commands = self.extractor.extract(&feedback);
                if !new_commands.is_empty() {
                    display_info(&format!(
                        "Added {} new command(s) based on feedback analysis.",
                        new_commands.len()
                    ));
                    queue.splice_after_cursor(new_commands);
                }
            }
            Err(e) => {
                display_error(&format!("Feedback request failed: {}", e));
                display_warning("Continuing with the remaining queued commands.");
                self.conversation
                    .append(Role::System, format!("Feedback request failed: {}", e));
            }
        }
    }
}

/// Conversation entry recorded for every executed command
fn format_result_entry(result: &ExecutionResult) -> String {
    format!(
        "Command execution {}:\n\n```\n{}\n```",
        result.status_word(),
        result.output
    )
}
