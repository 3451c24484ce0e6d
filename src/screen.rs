//! Alternate-screen session with restoration guaranteed on every exit path.
//!
//! Entering returns a guard that restores the original buffer on drop. The
//! module-level [`restore_terminal`] is idempotent and callable from any
//! thread, which is what the interrupt handler and the chained panic hook
//! use; whichever of guard drop, panic hook, or interrupt handler runs first
//! performs the single real restore.

use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};

static ALT_SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Guard for an active alternate-screen session. Only the guard that
/// actually entered the alternate buffer restores it on drop.
#[derive(Debug)]
pub struct ScreenSession {
    restore: bool,
}

/// Switches to the alternate buffer, clears it, and homes the cursor. Calling
/// again while active changes nothing and hands back a no-op guard, so the
/// session stays open until the outermost guard drops.
pub fn enter() -> io::Result<ScreenSession> {
    if ALT_SCREEN_ACTIVE
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        if let Err(err) = execute!(
            io::stdout(),
            EnterAlternateScreen,
            Clear(ClearType::All),
            MoveTo(0, 0)
        ) {
            ALT_SCREEN_ACTIVE.store(false, Ordering::SeqCst);
            return Err(err);
        }
        install_panic_hook();
        return Ok(ScreenSession { restore: true });
    }
    Ok(ScreenSession { restore: false })
}

/// Leaves the alternate buffer if it is active. Safe to call any number of
/// times, from any thread.
pub fn restore_terminal() -> io::Result<()> {
    if ALT_SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
        execute!(io::stdout(), LeaveAlternateScreen)?;
    }
    Ok(())
}

/// True while the alternate buffer is active.
pub fn is_active() -> bool {
    ALT_SCREEN_ACTIVE.load(Ordering::SeqCst)
}

/// Clears the active buffer and homes the cursor, as for a `/clear` replay.
pub fn clear_and_home() -> io::Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))
}

/// Chains a restore in front of whatever panic hook is already installed, so
/// panic output lands on the original buffer.
fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        previous(panic_info);
    }));
}

impl Drop for ScreenSession {
    fn drop(&mut self) {
        if self.restore {
            let _ = restore_terminal();
        }
    }
}
