/// Builds a [`KvNode`](crate::KvNode) from a JSON-like literal.
///
/// Objects take string-literal keys; leaves go through `KvNode::from`.
#[macro_export]
macro_rules! kv {
    // Handle empty array
    ([]) => {
        $crate::KvNode::Array(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::KvNode::Array(vec![$($crate::kv!($elem)),*])
    };

    // Handle empty object
    ({}) => {
        $crate::KvNode::Object($crate::KvMap::new())
    };

    // Handle non-empty object
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::KvMap::new();
        $(
            object.insert($key.to_string(), $crate::kv!($value));
        )*
        $crate::KvNode::Object(object)
    }};

    ($leaf:expr) => {
        $crate::KvNode::from($leaf)
    };
}

#[cfg(test)]
mod tests {
    use crate::{KvMap, KvNode, KvValue};

    #[test]
    fn test_kv_macro_leaves() {
        assert_eq!(kv!(42), KvNode::Value(KvValue::Int32(42)));
        assert_eq!(kv!(3.5), KvNode::Value(KvValue::Float(3.5)));
        assert_eq!(kv!(true), KvNode::Value(KvValue::Int32(1)));
        assert_eq!(kv!("hello"), KvNode::Value(KvValue::String("hello".to_string())));
        assert_eq!(kv!(7u64), KvNode::Value(KvValue::UInt64(7)));
    }

    #[test]
    fn test_kv_macro_arrays() {
        assert_eq!(kv!([]), KvNode::Array(vec![]));

        match kv!([1, "two", [3]]) {
            KvNode::Array(vec) => {
                assert_eq!(vec.len(), 3);
                assert_eq!(vec[1], KvNode::from("two"));
                assert_eq!(vec[2], KvNode::Array(vec![KvNode::from(3)]));
            }
            _ => panic!("Expected array"),
        }
    }

    #[test]
    fn test_kv_macro_objects() {
        assert_eq!(kv!({}), KvNode::Object(KvMap::new()));

        let obj = kv!({
            "name": "Alyx",
            "health": 100,
            "weapons": { "primary": "gravity gun" }
        });

        let map = obj.as_object().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("health"), Some(&KvNode::from(100)));
        assert_eq!(
            obj.get("weapons").and_then(|w| w.get("primary")).and_then(KvNode::as_str),
            Some("gravity gun")
        );
    }
}
