/*!
 * Periodic Schedule
 *
 * Runs fixed-rate background jobs (flush, correlation sweep, directory scan)
 * on one dedicated thread. Each job body runs on the blocking pool and is
 * awaited before the job's next tick, so a job never overlaps itself.
 */

mod task;

pub use task::{JobHandle, Schedule};
