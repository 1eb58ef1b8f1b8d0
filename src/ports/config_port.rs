//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// Present and numeric, or `None`.
    fn get_optional_int(&self, section: &str, key: &str) -> Option<i64> {
        self.get_string(section, key)
            .and_then(|v| v.trim().parse().ok())
    }
}
