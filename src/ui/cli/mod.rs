//! CLI - reedline-based REPL interface
//!
//! Line-oriented front-end for a debugging session: each line is either a
//! host command forwarded to the firmware or a local command that prints
//! session state.

use anyhow::Result;
use colored::Colorize;
use reedline::{
    Prompt, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal,
};
use std::borrow::Cow;

use crate::app::{Session, SessionError};
use crate::core::{Link, OperatingMode};
use crate::telemetry::{Button, ControlLine, CpuState};

/// Custom prompt for the debugger CLI
pub struct NibblerPrompt {
    /// Program counter from the latest snapshot
    pc: Option<u16>,
    /// Firmware operating mode
    mode: OperatingMode,
}

impl NibblerPrompt {
    pub fn new(mode: OperatingMode) -> Self {
        Self { pc: None, mode }
    }

    pub fn set_pc(&mut self, pc: Option<u16>) {
        self.pc = pc;
    }
}

impl Prompt for NibblerPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let mode = match self.mode {
            OperatingMode::Program => "prg",
            OperatingMode::Instruction => "ins",
        };
        match self.pc {
            Some(pc) => Cow::Owned(format!("[{}:{:#06x}]", mode, pc)),
            None => Cow::Owned(format!("[{}:------]", mode)),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "(failed) ",
        };
        Cow::Owned(format!("(search: {}{}) ", prefix, history_search.term))
    }
}

/// Local command parsing result
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Print the full latest snapshot: state
    State,
    /// Print the disassembly history: dis
    Disassembly,
    /// Print the event history: log
    Log,
    /// Decode frames that arrived unprompted: poll
    Poll,
    /// Help: ? or help
    Help,
    /// Quit: q or exit
    Quit,
    /// Anything else goes to the firmware
    Host(String),
}

/// Split local commands from host commands
pub fn parse_command(input: &str) -> ParsedCommand {
    match input.trim() {
        "state" | "regs" => ParsedCommand::State,
        "dis" | "disasm" => ParsedCommand::Disassembly,
        "log" => ParsedCommand::Log,
        "poll" | "" => ParsedCommand::Poll,
        "?" | "help" => ParsedCommand::Help,
        "q" | "quit" | "exit" => ParsedCommand::Quit,
        other => ParsedCommand::Host(other.to_string()),
    }
}

/// Print the help message
fn print_help(mode: OperatingMode) {
    println!("{}", "Nibbler Debugger Commands".bold().cyan());
    println!("{}", "═".repeat(50).cyan());

    println!("\n{}", "Firmware (upper case = loud, lower case = quiet):".bold().yellow());
    println!("  {}           Reset the CPU", "R / r".green());
    println!("  {}               Request the current state", "O".green());
    println!("  {}           Pulse the clock", "C / c".green());
    println!("  {}           Propagate without a clock edge", "P / p".green());
    println!("  {}         Set the buttons (0-15)", "B <n>".green());
    if mode == OperatingMode::Instruction {
        println!("  {}  Load an instruction, e.g. i LD 0xABC", "i <MN> <OPND>".green());
    }

    println!("\n{}", "Session:".bold().yellow());
    println!("  {}           Show the latest snapshot", "state".green());
    println!("  {}             Show disassembled instructions", "dis".green());
    println!("  {}             Show the event log", "log".green());
    println!("  {}            Read frames sent without a command", "poll".green());

    println!("\n{}", "Other:".bold().yellow());
    println!("  {}               Show this help", "?".green());
    println!("  {}               Quit", "q".green());
}

fn on_off(asserted: bool) -> colored::ColoredString {
    if asserted {
        "ON ".yellow().bold()
    } else {
        "off".dimmed()
    }
}

/// Print a full snapshot
fn print_state(state: &CpuState) {
    println!(
        "{} 0x{:04X}   {} I[0x{:X}] O[0x{:X}], 0x{:02X}   {} 0x{:02X}   {} {:?}",
        "PC:".bold(),
        state.pc,
        "FETCH:".bold(),
        state.opcode_nibble(),
        state.operand_nibble(),
        state.fetch,
        "PROGBYTE:".bold(),
        state.program_byte,
        "PHASE:".bold(),
        state.phase,
    );
    println!(
        "{} 0x{:02X}   {} 0x{:02X}   {} 0x{:02X}",
        "DATA:".bold(),
        state.data_bus,
        "ACC:".bold(),
        state.accumulator,
        "OUT:".bold(),
        state.output,
    );
    let buttons: Vec<String> = Button::ALL
        .iter()
        .map(|&b| format!("{}={}", b, if state.button_bit(b) { "up" } else { "down" }))
        .collect();
    println!("{} {}", "BUTTONS:".bold(), buttons.join(" "));
    println!(
        "{} Z={} C={} RESET={}",
        "FLAGS:".bold(),
        state.zero as u8,
        state.carry as u8,
        state.reset as u8
    );
    let (word0, word1) = state.microcode.words();
    println!("{} 0x{:02X} 0x{:02X}", "MICROCODE:".bold(), word0, word1);
    for word in ControlLine::ALL.chunks(4) {
        let cells: Vec<String> = word
            .iter()
            .map(|&line| format!("{:<11}{}", line.name(), on_off(state.microcode.asserted(line))))
            .collect();
        println!("  {}", cells.join("  "));
    }
}

/// Print the one-line summary of each new snapshot
fn print_events(states: &[CpuState]) {
    for state in states {
        println!("{} {}", "[*]".cyan(), state.label);
    }
    if states.is_empty() {
        println!("{}", "    (no response)".dimmed());
    }
}

/// Execute one line. Returns `false` when the user asked to quit.
fn execute_command<L: Link>(session: &mut Session<L>, cmd: ParsedCommand) -> Result<bool> {
    let result = match cmd {
        ParsedCommand::State => {
            match &session.state().current {
                Some(state) => print_state(state),
                None => println!("{}", "    (no state yet, try 'O')".dimmed()),
            }
            return Ok(true);
        }
        ParsedCommand::Disassembly => {
            for line in &session.state().disasm_log {
                println!("    {}", line);
            }
            return Ok(true);
        }
        ParsedCommand::Log => {
            for line in &session.state().command_log {
                println!("    {}", line);
            }
            return Ok(true);
        }
        ParsedCommand::Help => {
            print_help(session.mode());
            return Ok(true);
        }
        ParsedCommand::Quit => {
            println!("[*] Shutting down...");
            return Ok(false);
        }
        ParsedCommand::Poll => session.poll(),
        ParsedCommand::Host(line) => session.submit_line(&line),
    };

    match result {
        Ok(states) => print_events(&states),
        Err(e) if e.is_recoverable() => {
            println!("{} {}", "[!]".red(), e);
            println!("    Type '?' for help");
        }
        Err(SessionError::Decode(e)) => {
            anyhow::bail!("internal decoder inconsistency: {}", e)
        }
        Err(e) => return Err(e.into()),
    }
    Ok(true)
}

/// Run the CLI REPL on an open session
pub fn run_cli<L: Link>(mut session: Session<L>) -> Result<()> {
    let mut line_editor = Reedline::create();
    let mut prompt = NibblerPrompt::new(session.mode());

    println!(
        "{}",
        "╔══════════════════════════════════════════════════════════════╗".cyan()
    );
    let banner = format!(
        "║  Nibbler CPU Debugger ({:<16}) - '?' for help    ║",
        session.mode().to_string()
    );
    println!("{}", banner.as_str().cyan());
    println!(
        "{}",
        "╚══════════════════════════════════════════════════════════════╝".cyan()
    );

    loop {
        prompt.set_pc(session.state().pc());
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => {
                let cmd = parse_command(&buffer);
                if !execute_command(&mut session, cmd)? {
                    break;
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\n[*] Interrupted");
                break;
            }
        }
    }

    Ok(())
}
