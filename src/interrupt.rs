use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use signal_hook::consts::SIGINT;
use signal_hook::flag;

/// Route Ctrl+C into `interrupt`
///
/// The first SIGINT only sets the flag so the scan loop can stop and
/// clean up. A SIGINT arriving while the flag is already set terminates
/// the process, so a blocked read or the final prompt can still be left.
pub fn register(interrupt: &Arc<AtomicBool>) -> io::Result<()> {
	// must be registered first, it has to see the flag before it is set
	flag::register_conditional_shutdown(SIGINT, 1, Arc::clone(interrupt))?;
	flag::register(SIGINT, Arc::clone(interrupt))?;
	return Ok(());
}
