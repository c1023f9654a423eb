//! Tests for conformance of the codec to the recorded wire fixtures.
mod wire_conformance {
    use std::sync::OnceLock;

    use testresult::TestResult;
    use warrant_common::Address;
    use warrant_encoding::{CodecSettings, Instruction, InstructionCodec, WarrantEncodingError};

    const FIXTURE_STR: &str = include_str!("./fixtures/instructions.json");
    static FIXTURE: OnceLock<serde_json::Value> = OnceLock::new();
    fn fixture() -> &'static serde_json::Value {
        FIXTURE.get_or_init(|| serde_json::from_str(FIXTURE_STR).expect("fixture is invalid JSON"))
    }

    fn codec() -> InstructionCodec {
        let settings = serde_json::json!({ "magic": fixture()["magic"] }).to_string();
        InstructionCodec::new(&CodecSettings::from_json(&settings).expect("magic is valid"))
    }

    fn bytes(entry: &serde_json::Value, field: &str) -> Vec<u8> {
        let text = entry[field].as_str().expect("field is a hex string");
        hex::decode(text).expect("field is valid hex")
    }

    #[test]
    fn test_decode_cases() -> TestResult {
        let cases = fixture()["decode"].as_array().expect("decode is an array");
        for case in cases {
            let name = case["name"].as_str().expect("case has a name");
            let payload = bytes(case, "payload");
            let result = codec().decode(&payload);

            match case["expect"].as_str().expect("case has an expectation") {
                "grant" | "revoke" => {
                    let set = match result? {
                        Some(Instruction::Grant(set)) if case["expect"] == "grant" => set,
                        Some(Instruction::Revoke(set)) if case["expect"] == "revoke" => set,
                        other => panic!("'{name}' decoded to {other:?}"),
                    };
                    assert_eq!(set.to_hex(), case["capabilities"], "'{name}'");
                }
                "adjust" => {
                    let Some(Instruction::AdjustAccessAllowance { target, delta }) = result? else {
                        panic!("'{name}' is not an allowance adjustment");
                    };
                    let expected: Address = serde_json::from_value(case["target"].clone())?;
                    assert_eq!(target, expected, "'{name}'");
                    assert_eq!(delta, case["delta"], "'{name}'");
                }
                "ignored" => assert_eq!(result?, None, "'{name}'"),
                "malformed" => assert!(
                    matches!(result, Err(WarrantEncodingError::MalformedInput(_))),
                    "'{name}' decoded to {result:?}"
                ),
                other => panic!("unknown expectation {other}"),
            }
        }
        Ok(())
    }

    #[test]
    fn test_split_cases() -> TestResult {
        let cases = fixture()["split"].as_array().expect("split is an array");
        for case in cases {
            let name = case["name"].as_str().expect("case has a name");
            let payload = bytes(case, "payload");
            let result = codec().split(&payload);

            if case["malformed"] == true {
                assert!(result.is_err(), "'{name}' split to {result:?}");
                continue;
            }
            let split = result?;
            assert_eq!(split.authorization, bytes(case, "authorization"), "'{name}'");
            assert_eq!(split.remainder, bytes(case, "remainder"), "'{name}'");
        }
        Ok(())
    }

    #[test]
    fn test_encoding_reproduces_decodable_fixtures() -> TestResult {
        let cases = fixture()["decode"].as_array().expect("decode is an array");
        for case in cases {
            let payload = bytes(case, "payload");
            let Ok(Some(instruction)) = codec().decode(&payload) else {
                continue;
            };
            let encoded = codec().encode(&instruction)?;
            assert_eq!(codec().decode(&encoded)?, Some(instruction));
        }
        Ok(())
    }
}
