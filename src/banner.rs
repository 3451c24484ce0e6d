//! Startup banner: ASCII art revealed by a diagonal wipe, plus the session
//! info block. Replayed by `/clear`.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::chat::ChatConfig;

const ART: [&str; 8] = [
    r"  _______ _    _ _____ _   _ _  ________ _____     _____ _    _       _______ ",
    r" |__   __| |  | |_   _| \ | | |/ /  ____|  __ \   / ____| |  | |   /\|__   __|",
    r"    | |  | |__| | | | |  \| | ' /| |__  | |__) | | |    | |__| |  /  \  | |   ",
    r"    | |  |  __  | | | | . ` |  < |  __| |  _  /  | |    |  __  | / /\ \ | |   ",
    r"    | |  | |  | |_| |_| |\  | . \| |____| | \ \  | |____| |  | |/ ____ \| |   ",
    r"    |_|  |_|  |_|_____|_| \_|_|\_\______|_|  \_\  \_____|_|  |_/_/    \_\_|   ",
    r"",
    r"",
];

const WIPE_CHARS: [char; 4] = ['|', '/', '-', '\\'];
const FRAME_DELAY: Duration = Duration::from_micros(7500);
const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Wipes the banner onto the screen, finishing with a clean redraw and a
/// separator line. Assumes the cursor starts on a cleared screen.
pub fn animate_banner(out: &mut impl Write) -> io::Result<()> {
    animate_banner_at(out, FRAME_DELAY, SETTLE_DELAY)
}

fn animate_banner_at(
    out: &mut impl Write,
    frame_delay: Duration,
    settle_delay: Duration,
) -> io::Result<()> {
    let art: Vec<Vec<char>> = ART.iter().map(|line| line.chars().collect()).collect();
    let width = art.iter().map(Vec::len).max().unwrap_or(0);
    let height = art.len();
    if width == 0 {
        return Ok(());
    }

    // Diagonal sweep: cell (r, c) is revealed once r + c falls behind the
    // frame index, and the boundary cell carries the cycling wipe character.
    for frame in 0..width + height {
        let wipe = WIPE_CHARS[frame % WIPE_CHARS.len()];
        queue!(out, MoveTo(0, 0))?;
        for (row, line) in art.iter().enumerate() {
            let mut rendered = String::with_capacity(width);
            for col in 0..width {
                if row + col < frame {
                    rendered.push(line.get(col).copied().unwrap_or(' '));
                } else if row + col == frame {
                    rendered.push(wipe);
                } else {
                    rendered.push(' ');
                }
            }
            writeln!(out, "{rendered}")?;
        }
        out.flush()?;
        thread::sleep(frame_delay);
    }

    // Clear the animation area, then redraw the art without wipe characters.
    for row in 0..height {
        queue!(out, MoveTo(0, row as u16), Clear(ClearType::CurrentLine))?;
    }
    queue!(out, MoveTo(0, 0))?;
    for line in ART {
        writeln!(out, "{line:<width$}")?;
    }
    out.flush()?;
    thread::sleep(settle_delay);

    writeln!(out, "{}", "-".repeat(width))?;
    writeln!(out)?;
    out.flush()
}

/// Prints the session info block shown under the banner.
pub fn print_info(out: &mut impl Write, config: &ChatConfig) -> io::Result<()> {
    writeln!(
        out,
        "Enter 'q' or 'quit' to exit. Enter '/clear' to reset the chat."
    )?;
    writeln!(out, "Model: {}", config.model)?;
    writeln!(
        out,
        "Max Tokens: {}, Temp: {}, Seed: {}",
        config.max_tokens, config.temperature, config.seed
    )?;
    writeln!(out, "{}", "-".repeat(10))?;
    out.flush()
}
