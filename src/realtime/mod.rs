//! Lock-free plumbing between the control thread, the capture callback and
//! the playback callback.

mod context;
mod control;
mod ring;

pub use context::{InputSource, ProcessContext};
pub use control::FilterControl;
pub use ring::{RingConsumer, RingProducer, SampleRing};

/// Pushes one capture block into the ring, counting a dropped block as an
/// overrun. Called from the capture callback.
pub fn push_capture(producer: &mut RingProducer, block: &[f32], control: &FilterControl) {
    if producer.push_slice(block) < block.len() {
        control.record_overrun();
    }
}
