//! Micheline expression trees as returned by the node's JSON endpoints.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// A Micheline primitive expression.
///
/// [`Prim::Invalid`] is the default value and never produced by decoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPrim")]
pub enum Prim {
    #[default]
    Invalid,
    /// Arbitrary precision integer in decimal notation.
    Int(String),
    String(String),
    /// Hex encoded bytes.
    Bytes(String),
    Seq(Vec<Prim>),
    /// A primitive application such as `Pair`, `big_map` or `parameter`.
    App {
        prim: String,
        args: Vec<Prim>,
        annots: Vec<String>,
    },
}

// Each node kind rejects keys of the others so mixed objects fail to decode.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct IntNode {
    int: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StringNode {
    string: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BytesNode {
    bytes: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AppNode {
    prim: String,
    #[serde(default)]
    args: Vec<Prim>,
    #[serde(default)]
    annots: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrim {
    Int(IntNode),
    String(StringNode),
    Bytes(BytesNode),
    App(AppNode),
    Seq(Vec<Prim>),
}

/// An `int` node whose text is not a decimal integer.
#[derive(Debug, thiserror::Error)]
#[error("invalid Micheline integer {0:?}")]
pub struct InvalidIntError(String);

fn is_decimal(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl TryFrom<RawPrim> for Prim {
    type Error = InvalidIntError;

    fn try_from(raw: RawPrim) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawPrim::Int(IntNode { int }) if is_decimal(&int) => Self::Int(int),
            RawPrim::Int(IntNode { int }) => return Err(InvalidIntError(int)),
            RawPrim::String(StringNode { string }) => Self::String(string),
            RawPrim::Bytes(BytesNode { bytes }) => Self::Bytes(bytes),
            RawPrim::App(AppNode {
                prim,
                args,
                annots,
            }) => Self::App {
                prim,
                args,
                annots,
            },
            RawPrim::Seq(items) => Self::Seq(items),
        })
    }
}

impl Serialize for Prim {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Invalid => serializer.serialize_unit(),
            Self::Int(value) => single_entry(serializer, "int", value),
            Self::String(value) => single_entry(serializer, "string", value),
            Self::Bytes(value) => single_entry(serializer, "bytes", value),
            Self::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::App {
                prim,
                args,
                annots,
            } => {
                let len = 1 + usize::from(!args.is_empty()) + usize::from(!annots.is_empty());
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("prim", prim)?;
                if !args.is_empty() {
                    map.serialize_entry("args", args)?;
                }
                if !annots.is_empty() {
                    map.serialize_entry("annots", annots)?;
                }
                map.end()
            }
        }
    }
}

fn single_entry<S: Serializer>(serializer: S, key: &str, value: &str) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

impl Prim {
    /// Builds a primitive application without annotations.
    pub fn app(prim: impl Into<String>, args: Vec<Prim>) -> Self {
        Self::App {
            prim: prim.into(),
            args,
            annots: Vec::new(),
        }
    }

    /// Returns `false` only for the [`Prim::Invalid`] sentinel.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// The primitive name of an application node.
    pub fn prim_name(&self) -> Option<&str> {
        match self {
            Self::App { prim, .. } => Some(prim),
            _ => None,
        }
    }

    /// Arguments of an application node, or the items of a sequence.
    pub fn args(&self) -> &[Prim] {
        match self {
            Self::App { args, .. } => args,
            Self::Seq(items) => items,
            _ => &[],
        }
    }

    /// Annotations of an application node.
    pub fn annots(&self) -> &[String] {
        match self {
            Self::App { annots, .. } => annots,
            _ => &[],
        }
    }

    /// Parses an `Int` node that fits in 64 bits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => value.parse().ok(),
            _ => None,
        }
    }
}

/// The code sections of an originated contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Code {
    /// Argument of the `parameter` section.
    pub param_type: Prim,
    /// Argument of the `storage` section.
    pub storage_type: Prim,
    /// Argument of the `code` section.
    pub code: Prim,
    /// Complete `view` sections in declaration order.
    pub views: Vec<Prim>,
}

/// A top-level section the code sequence does not define.
#[derive(Debug, thiserror::Error)]
#[error("unexpected script section {0:?}")]
pub struct ScriptSectionError(String);

impl TryFrom<Vec<Prim>> for Code {
    type Error = ScriptSectionError;

    fn try_from(sections: Vec<Prim>) -> Result<Self, Self::Error> {
        let mut code = Code::default();
        for section in sections {
            let (prim, args) = match section {
                Prim::App { prim, args, .. } => (prim, args),
                other => return Err(ScriptSectionError(format!("{other:?}"))),
            };
            match prim.as_str() {
                "parameter" => code.param_type = first_arg(args),
                "storage" => code.storage_type = first_arg(args),
                "code" => code.code = first_arg(args),
                "view" => code.views.push(Prim::app("view", args)),
                other => return Err(ScriptSectionError(other.to_string())),
            }
        }
        Ok(code)
    }
}

fn first_arg(args: Vec<Prim>) -> Prim {
    args.into_iter().next().unwrap_or_default()
}

impl From<Code> for Vec<Prim> {
    fn from(code: Code) -> Self {
        let mut sections = vec![
            Prim::app("parameter", vec![code.param_type]),
            Prim::app("storage", vec![code.storage_type]),
            Prim::app("code", vec![code.code]),
        ];
        sections.extend(code.views);
        sections
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Vec::<Prim>::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Prim>::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

/// Code and current storage of an originated contract.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub code: Code,
    pub storage: Prim,
}

impl Script {
    /// The contract's parameter type.
    pub fn param_type(&self) -> &Prim {
        &self.code.param_type
    }

    /// The contract's storage type.
    pub fn storage_type(&self) -> &Prim {
        &self.code.storage_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_each_node_kind() {
        let prim: Prim = serde_json::from_value(json!({
            "prim": "Pair",
            "args": [
                { "int": "42" },
                [{ "string": "hello" }, { "bytes": "0a0b" }]
            ],
            "annots": ["%data"]
        }))
        .expect("decode");

        assert_eq!(prim.prim_name(), Some("Pair"));
        assert_eq!(prim.annots(), ["%data".to_string()]);
        assert_eq!(prim.args()[0].as_i64(), Some(42));
        assert_eq!(
            prim.args()[1],
            Prim::Seq(vec![
                Prim::String("hello".to_string()),
                Prim::Bytes("0a0b".to_string()),
            ])
        );
    }

    #[test]
    fn application_without_args_decodes() {
        let prim: Prim = serde_json::from_value(json!({ "prim": "Unit" })).expect("decode");
        assert_eq!(prim, Prim::app("Unit", vec![]));
        assert!(prim.is_valid());
    }

    #[test]
    fn big_integers_are_kept_verbatim() {
        let prim: Prim =
            serde_json::from_value(json!({ "int": "340282366920938463463374607431768211456" }))
                .expect("decode");
        assert_eq!(prim.as_i64(), None);
        assert_eq!(
            prim,
            Prim::Int("340282366920938463463374607431768211456".to_string())
        );
    }

    #[test]
    fn invalid_is_the_default() {
        assert_eq!(Prim::default(), Prim::Invalid);
        assert!(!Prim::default().is_valid());
        assert!(serde_json::from_value::<Prim>(json!(null)).is_err());
        assert!(serde_json::from_value::<Prim>(json!(7)).is_err());
    }

    #[test]
    fn non_decimal_int_is_rejected() {
        for bad in ["not-a-number", "", "-", "1.5", "+3", " 7"] {
            let err = serde_json::from_value::<Prim>(json!({ "int": bad })).unwrap_err();
            assert!(err.to_string().contains("invalid Micheline integer"), "{bad:?}: {err}");
        }
        let prim: Prim = serde_json::from_value(json!({ "int": "-0042" })).expect("decode");
        assert_eq!(prim.as_i64(), Some(-42));
    }

    #[test]
    fn mixed_node_keys_are_rejected() {
        for bad in [
            json!({ "int": "1", "prim": "Pair" }),
            json!({ "string": "a", "bytes": "00" }),
            json!({ "prim": "Unit", "int": "1" }),
            json!({ "prim": "Pair", "args": [{ "int": "1", "string": "x" }] }),
        ] {
            assert!(serde_json::from_value::<Prim>(bad.clone()).is_err(), "{bad}");
        }
    }

    #[test]
    fn encodes_back_to_micheline_json() {
        let source = json!({
            "prim": "Elt",
            "args": [{ "string": "key" }, { "prim": "Some", "args": [{ "int": "-3" }] }]
        });
        let prim: Prim = serde_json::from_value(source.clone()).expect("decode");
        assert_eq!(serde_json::to_value(&prim).expect("encode"), source);
    }

    #[test]
    fn script_splits_code_sections() {
        let script: Script = serde_json::from_value(json!({
            "code": [
                { "prim": "parameter", "args": [{ "prim": "unit" }] },
                { "prim": "storage", "args": [{ "prim": "nat" }] },
                { "prim": "code", "args": [[{ "prim": "CDR" }]] },
                { "prim": "view", "args": [{ "string": "get" }, { "prim": "unit" }, { "prim": "nat" }, []] }
            ],
            "storage": { "int": "7" }
        }))
        .expect("decode");

        assert_eq!(script.param_type(), &Prim::app("unit", vec![]));
        assert_eq!(script.storage_type(), &Prim::app("nat", vec![]));
        assert_eq!(script.code.code, Prim::Seq(vec![Prim::app("CDR", vec![])]));
        assert_eq!(script.code.views.len(), 1);
        assert_eq!(script.code.views[0].args()[0], Prim::String("get".into()));
        assert_eq!(script.storage.as_i64(), Some(7));
    }

    #[test]
    fn script_rejects_unknown_sections() {
        let err = serde_json::from_value::<Script>(json!({
            "code": [{ "prim": "tickets", "args": [] }],
            "storage": { "int": "0" }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unexpected script section"));
    }
}
