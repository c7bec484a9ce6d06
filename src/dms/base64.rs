// base64.rs
//
// Copyright (C) 2019-2026  Minnesota Department of Transportation
//
//! Bitmaps stored as base64 strings, for fields declared with
//! `#[serde(with = "super::base64")]`
use base64::display::Base64Display;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Encode a bitmap as a base64 string
pub fn serialize<S>(bitmap: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let encoded = Base64Display::with_config(bitmap, base64::STANDARD);
    serializer.collect_str(&encoded)
}

/// Decode a bitmap from a base64 string
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    base64::decode(encoded.trim()).map_err(de::Error::custom)
}

#[cfg(test)]
mod test {
    #[derive(Debug, Deserialize, PartialEq, Serialize)]
    struct Bitmap {
        #[serde(with = "super")]
        bits: Vec<u8>,
    }

    #[test]
    fn encode() {
        let bm = Bitmap {
            bits: vec![0x90, 0xFF],
        };
        assert_eq!(serde_json::to_string(&bm).unwrap(), r#"{"bits":"kP8="}"#);
    }

    #[test]
    fn decode() {
        let bm: Bitmap = serde_json::from_str(r#"{"bits":" kP8= "}"#).unwrap();
        assert_eq!(bm.bits, vec![0x90, 0xFF]);
        assert!(serde_json::from_str::<Bitmap>(r#"{"bits":"*"}"#).is_err());
    }
}
