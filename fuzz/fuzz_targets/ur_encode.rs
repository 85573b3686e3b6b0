use honggfuzz::fuzz;

use ur_registry::{Decoder, Encoder};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some(&first) = data.first() else {
                return;
            };
            let max_length = 1 + usize::from(first);
            let mut encoder = Encoder::new(data, max_length, "bytes").unwrap();
            let mut decoder = Decoder::default();
            // drop the first pure part so recovery needs a mixed one
            encoder.next_part().unwrap();
            while !decoder.complete() {
                let part = encoder.next_part().unwrap();
                decoder.receive(&part).unwrap();
            }
            assert_eq!(decoder.message().unwrap().unwrap(), data);
        });
    }
}
