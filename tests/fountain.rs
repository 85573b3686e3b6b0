use ur_registry::fountain::{Decoder, Encoder, Error, Part};
use ur_registry::xoshiro::Xoshiro256;
use ur_registry::ErrorKind;

fn pattern(length: u8) -> Vec<u8> {
    (0..length).collect()
}

fn message(seed: &str, length: usize) -> Vec<u8> {
    Xoshiro256::new(seed.as_bytes()).next_bytes(length)
}

fn parts(encoder: &mut Encoder, count: usize) -> Vec<Part> {
    (0..count).map(|_| encoder.next_part()).collect()
}

fn feed(decoder: &mut Decoder, parts: &[Part]) {
    for part in parts {
        decoder.receive(part).unwrap();
    }
}

#[test]
fn any_permutation_with_duplicates_completes() {
    let data = message("Wolf", 1000);
    let mut encoder = Encoder::new(&data, 60).unwrap();
    let count = encoder.fragment_count();
    let all = parts(&mut encoder, count * 3);

    for seed in ["one", "two", "three", "four"] {
        let mut rng = Xoshiro256::new(seed.as_bytes());
        let mut stream = all.clone();
        // duplicate a third of the parts
        for i in (0..all.len()).step_by(3) {
            stream.push(all[i].clone());
        }
        let stream = rng.shuffled(stream);

        let mut decoder = Decoder::default();
        for part in &stream {
            decoder.receive(part).unwrap();
        }
        assert!(decoder.complete(), "seed {seed}");
        assert_eq!(decoder.message().unwrap(), Some(data.clone()));
    }
}

#[test]
fn reversed_pure_parts_complete() {
    let data = pattern(40);
    let mut encoder = Encoder::new(&data, 10).unwrap();
    let mut pure = parts(&mut encoder, 4);
    pure.reverse();
    let mut decoder = Decoder::default();
    for (received, part) in pure.iter().enumerate() {
        assert!(!decoder.complete());
        assert!(decoder.receive(part).unwrap());
        assert_eq!(decoder.progress().resolved, received + 1);
    }
    assert!(decoder.complete());
    assert_eq!(decoder.message().unwrap(), Some(data));
}

#[test]
fn pure_parts_in_order_complete() {
    let data = message("pure", 2500);
    let mut encoder = Encoder::new(&data, 200).unwrap();
    let count = encoder.fragment_count();
    let pure = parts(&mut encoder, count);
    assert!(pure.iter().all(Part::is_simple));

    let mut decoder = Decoder::default();
    feed(&mut decoder, &pure[..count - 1]);
    assert!(!decoder.complete());
    assert_eq!(decoder.progress().missing, vec![count - 1]);
    feed(&mut decoder, &pure[count - 1..]);
    assert!(decoder.complete());
    assert_eq!(decoder.message().unwrap(), Some(data));
}

#[test]
fn lost_pure_part_is_recovered_from_mixed_parts() {
    let data = pattern(40);
    let mut encoder = Encoder::new(&data, 10).unwrap();
    let stream = parts(&mut encoder, 11);
    // part 11 mixes fragments 0, 1 and 3
    assert_eq!(stream[10].indexes().len(), 3);

    let mut decoder = Decoder::default();
    for part in [&stream[0], &stream[2], &stream[3]] {
        decoder.receive(part).unwrap();
    }
    assert_eq!(decoder.progress().missing, vec![1]);
    assert!(decoder.receive(&stream[10]).unwrap());
    assert!(decoder.complete());
    assert_eq!(decoder.message().unwrap(), Some(data.clone()));

    // part 8 mixes fragments 0 and 2
    let mut decoder = Decoder::default();
    for part in [&stream[7], &stream[0], &stream[1], &stream[3]] {
        decoder.receive(part).unwrap();
    }
    assert!(decoder.complete());
    assert_eq!(decoder.message().unwrap(), Some(data));
}

#[test]
fn mixed_parts_alone_complete() {
    let data = message("mixed", 3000);
    let mut encoder = Encoder::new(&data, 100).unwrap();
    let count = encoder.fragment_count();
    let stream: Vec<Part> = parts(&mut encoder, count * 6)
        .into_iter()
        .skip(count)
        .filter(|part| !part.is_simple())
        .collect();

    let mut decoder = Decoder::default();
    for part in &stream {
        if decoder.complete() {
            break;
        }
        decoder.receive(part).unwrap();
    }
    assert!(decoder.complete());
    assert_eq!(decoder.message().unwrap(), Some(data));
}

#[test]
fn interleaved_transfers_stay_apart() {
    let first = message("first", 700);
    let second = message("second", 700);
    let mut a = Encoder::new(&first, 50).unwrap();
    let mut b = Encoder::new(&second, 50).unwrap();
    assert_eq!(a.fragment_count(), b.fragment_count());
    assert_ne!(a.checksum(), b.checksum());

    let mut delivered = Vec::new();
    for _ in 0..a.fragment_count() * 2 {
        delivered.push(a.next_part());
        delivered.push(b.next_part());
    }

    let mut decoders = [(a.checksum(), Decoder::default()), (b.checksum(), Decoder::default())];
    for part in &delivered {
        for (checksum, decoder) in &mut decoders {
            if part.checksum() == *checksum {
                decoder.receive(part).unwrap();
            }
        }
    }
    let [(_, first_decoder), (_, second_decoder)] = decoders;
    assert_eq!(first_decoder.message().unwrap(), Some(first));
    assert_eq!(second_decoder.message().unwrap(), Some(second));
}

#[test]
fn cross_talk_is_a_protocol_error() {
    let mut a = Encoder::new(&message("first", 700), 50).unwrap();
    let mut b = Encoder::new(&message("second", 700), 50).unwrap();
    let mut decoder = Decoder::default();
    decoder.receive(&a.next_part()).unwrap();

    b.next_part();
    let foreign = b.next_part();
    let err = decoder.receive(&foreign).unwrap_err();
    assert!(matches!(err, Error::InconsistentPart { .. }));
    assert_eq!(err.kind(), ErrorKind::Protocol);

    // the rejected part left no trace
    assert_eq!(decoder.progress().processed, 1);
    decoder.receive(&a.next_part()).unwrap();
    assert_eq!(decoder.progress().resolved, 2);
}

#[test]
fn forty_byte_reference_vector() {
    let data = pattern(40);
    let mut encoder = Encoder::new(&data, 10).unwrap();
    assert_eq!(encoder.fragment_count(), 4);

    let stream = parts(&mut encoder, 8);
    for (index, part) in stream[..4].iter().enumerate() {
        assert_eq!(part.indexes(), vec![index]);
        assert_eq!(part.data(), &data[index * 10..(index + 1) * 10]);
    }

    let mut mixed = stream[7].indexes();
    mixed.sort_unstable();
    assert_eq!(mixed, vec![0, 2]);
    let xor: Vec<u8> = data[..10]
        .iter()
        .zip(&data[20..30])
        .map(|(x, y)| x ^ y)
        .collect();
    assert_eq!(stream[7].data(), xor);
    assert_eq!(hex::encode(stream[7].data()), "141414141c1c1c1c1414");
}
