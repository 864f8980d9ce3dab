/// Application name. Also the default database name.
pub const APP_NAME: &str = "challengr";

/// Upper-cases the first character of `s`, leaving the rest untouched.
pub fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn app_title() -> String {
    format!("Project {} by Ze !Dream Team", capitalized(APP_NAME))
}
