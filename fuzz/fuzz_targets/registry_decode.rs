use honggfuzz::fuzz;

use ur_registry::registry::TagRegistry;

fn main() {
    let registry = TagRegistry::default();
    let types: Vec<&str> = registry.registry_types().map(|t| t.ur_type()).collect();
    loop {
        fuzz!(|data: &[u8]| {
            if let Ok(object) = registry.decode_tagged(data) {
                let bytes = object.to_bytes().unwrap();
                assert_eq!(registry.decode(object.ur_type(), &bytes).unwrap(), object);
            }
            for ur_type in &types {
                if let Ok(object) = registry.decode(ur_type, data) {
                    let bytes = object.to_bytes().unwrap();
                    assert_eq!(registry.decode(ur_type, &bytes).unwrap(), object);
                }
            }
        });
    }
}
