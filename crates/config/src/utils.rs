use serde::de;

use slalink_core_types::Wei;

/// Deserializes an amount of wei from either a native integer or a decimal string.
///
/// Amounts above `i64::MAX` cannot be written as TOML integers nor passed
/// through environment variables as numbers, hence the string form.
pub fn wei_from_anything<'de, D>(deserializer: D) -> Result<Wei, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct WeiVisitor;

    impl<'de> de::Visitor<'de> for WeiVisitor {
        type Value = Wei;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "an amount of wei or a string representing one")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Wei::new(v as u128))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u128::try_from(v)
                .map(Wei::new)
                .map_err(|_| E::custom(format!("negative amount of wei: {v}")))
        }

        fn visit_u128<E>(self, v: u128) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Wei::new(v))
        }

        fn visit_i128<E>(self, v: i128) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u128::try_from(v)
                .map(Wei::new)
                .map_err(|_| E::custom(format!("negative amount of wei: {v}")))
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.trim()
                .parse::<u128>()
                .map(Wei::new)
                .map_err(|_| E::custom(format!("invalid amount of wei: {v}")))
        }
    }

    deserializer.deserialize_any(WeiVisitor)
}
