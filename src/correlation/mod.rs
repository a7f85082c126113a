/*!
 * Request Timing Correlation
 *
 * Pairs the start of a call with its completion across interception points.
 * Keys are derived from the runtime's raw request id; see [`RequestKey`].
 */

mod key;
mod store;

pub use key::RequestKey;
pub use store::TimingCorrelator;
