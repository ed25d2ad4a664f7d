// src/cli/menu.rs
//! Interactive text menu
//!
//! Generic over its input and output so a scripted session can drive it.

use crate::cli::resolve_payload;
use crate::miner::MiningController;
use crate::render::{self, chart::render_chart, export};
use crate::utils::error::MinerError;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const CHART_WIDTH: usize = 60;
const CHART_HEIGHT: usize = 12;

/// Menu loop bound to one controller
pub struct Menu<'a, R, W> {
    controller: &'a MiningController,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    /// Creates a menu reading choices from `input` and printing to `output`
    pub fn new(controller: &'a MiningController, input: R, output: W) -> Self {
        Menu {
            controller,
            input,
            output,
        }
    }

    /// Runs until the user quits or the input ends
    pub fn run(&mut self) -> Result<(), MinerError> {
        writeln!(self.output, "Proof-of-work Mining Simulator")?;
        writeln!(self.output, "------------------------------")?;
        writeln!(self.output, "Options:")?;
        writeln!(self.output, "1. Start mining")?;
        writeln!(self.output, "2. Show hash rate chart")?;
        writeln!(self.output, "3. Export hash rate history")?;
        writeln!(self.output, "4. Quit")?;

        loop {
            let Some(choice) = self.prompt("\nYour choice: ")? else {
                break;
            };
            match choice.trim() {
                "1" => self.start_mining()?,
                "2" => self.show_chart()?,
                "3" => self.export()?,
                "4" => break,
                _ => writeln!(self.output, "Invalid choice")?,
            }
        }

        if self.controller.is_running() {
            self.stop_mining()?;
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    /// Prints `message` and reads one line; `None` at end of input
    fn prompt(&mut self, message: &str) -> Result<Option<String>, MinerError> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn start_mining(&mut self) -> Result<(), MinerError> {
        if self.controller.is_running() {
            writeln!(self.output, "{}", MinerError::AlreadyRunning)?;
            return Ok(());
        }

        let data = self
            .prompt("Enter block data (or leave empty for the default): ")?
            .unwrap_or_default();
        let payload = resolve_payload(&data, self.controller.config());
        if let Err(e) = self.controller.start(payload.as_str()) {
            writeln!(self.output, "{}", e)?;
            return Ok(());
        }
        writeln!(
            self.output,
            "Mining \"{}\" with difficulty {}...",
            payload,
            self.controller.config().difficulty
        )?;

        self.prompt("Press Enter to stop mining...")?;
        self.stop_mining()
    }

    fn stop_mining(&mut self) -> Result<(), MinerError> {
        let result = self.controller.stop();
        if let Some(block) = self.controller.last_block() {
            writeln!(self.output, "\n{}", render::render_block(&block))?;
        }
        match result {
            Ok(stats) => writeln!(self.output, "\n{}", stats)?,
            Err(e) => writeln!(self.output, "\nMining failed: {}", e)?,
        }
        Ok(())
    }

    fn show_chart(&mut self) -> Result<(), MinerError> {
        let history = self.controller.history();
        writeln!(
            self.output,
            "{}",
            render_chart(&history, CHART_WIDTH, CHART_HEIGHT)
        )?;
        Ok(())
    }

    fn export(&mut self) -> Result<(), MinerError> {
        let Some(path) = self.prompt("Export file (.json or .csv): ")? else {
            return Ok(());
        };
        let path = PathBuf::from(path.trim());
        if path.as_os_str().is_empty() {
            writeln!(self.output, "{}", MinerError::InputError("empty file name".into()))?;
            return Ok(());
        }

        let history = self.controller.history();
        match export::export_history(&history, &path, export::format_for(&path)) {
            Ok(()) => writeln!(
                self.output,
                "Exported {} sample(s) to {}",
                history.len(),
                path.display()
            )?,
            Err(e) => writeln!(self.output, "{}", e)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn run_script(config: Config, script: &str) -> String {
        let controller = MiningController::new(config).unwrap();
        let mut output = Vec::new();
        Menu::new(&controller, script.as_bytes(), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn easy() -> Config {
        Config {
            difficulty: 0,
            ..Config::default()
        }
    }

    #[test]
    fn chart_before_mining_has_no_data() {
        let output = run_script(Config::default(), "2\n4\n");
        assert!(output.contains("No data to display"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[test]
    fn invalid_choice_reprompts() {
        let output = run_script(Config::default(), "9\n4\n");
        assert!(output.contains("Invalid choice"));
        assert_eq!(output.matches("Your choice: ").count(), 2);
    }

    #[test]
    fn start_then_enter_reports_statistics() {
        let output = run_script(easy(), "1\nhello\n\n4\n");
        assert!(output.contains("Mining \"hello\" with difficulty 0"));
        assert!(output.contains("Hashes computed: "));
        assert!(output.contains("Blocks found: "));
    }

    #[test]
    fn stop_reports_the_found_block() {
        let controller = MiningController::new(easy()).unwrap();
        controller.start("hello").unwrap();
        controller
            .wait_for_block(std::time::Duration::from_secs(10))
            .unwrap();

        let mut output = Vec::new();
        Menu::new(&controller, "".as_bytes(), &mut output)
            .stop_mining()
            .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Block found! Nonce: 1"));
        assert!(output.contains("Blocks found: 1"));
    }

    #[test]
    fn empty_payload_uses_a_random_block_name() {
        let output = run_script(easy(), "1\n\n\n4\n");
        assert!(output.contains("Mining \"Block #"));
    }

    #[test]
    fn end_of_input_stops_a_running_session() {
        let output = run_script(
            Config {
                difficulty: 64,
                ..Config::default()
            },
            "1\npayload\n",
        );
        assert!(output.contains("Blocks found: 0"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[test]
    fn exports_history_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let output = run_script(easy(), &format!("1\nx\n\n3\n{}\n4\n", path.display()));
        assert!(output.contains("Exported 0 sample(s)"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("timestamp,elapsed_secs,hashes,hash_rate"));
    }
}
