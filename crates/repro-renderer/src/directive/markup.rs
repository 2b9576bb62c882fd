//! LaTeX markup produced by directive substitution.

const CENTER_BEGIN: &str = "\\begin{center}";
const CENTER_END: &str = "\\end{center}";

/// `\href{url}{text}`.
#[must_use]
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\\href{{{url}}}{{{text}}}")
}

/// Small boxed label linking to the source computation.
#[must_use]
pub fn badge(url: &str, label: &str) -> String {
    hyperlink(url, &format!("\\fbox{{\\scriptsize {label}}}"))
}

/// Strip a surrounding `center` environment.
///
/// Returns the inner text and whether the value was centered.
#[must_use]
pub fn unwrap_centering(value: &str) -> (&str, bool) {
    let trimmed = value.trim();
    match trimmed
        .strip_prefix(CENTER_BEGIN)
        .and_then(|rest| rest.strip_suffix(CENTER_END))
    {
        Some(inner) => (inner.trim(), true),
        None => (value, false),
    }
}

/// Value followed by a trailing badge row, re-centered if it was centered.
#[must_use]
pub fn with_badge(value: &str, badge: &str) -> String {
    let (inner, centered) = unwrap_centering(value);
    let body = format!("{inner}\\\\\n{badge}");
    if centered {
        format!("{CENTER_BEGIN}\n{body}\n{CENTER_END}")
    } else {
        body
    }
}

/// Figure block for a legacy plot entry.
#[must_use]
pub fn figure(path: &str, caption: Option<&str>, badge: Option<&str>) -> String {
    let mut lines = vec![
        "\\begin{figure}[htbp]".to_owned(),
        "\\centering".to_owned(),
        format!("\\includegraphics[width=\\linewidth]{{{path}}}"),
    ];
    if let Some(caption) = caption {
        lines.push(format!("\\caption{{{caption}}}"));
    }
    if let Some(badge) = badge {
        lines.push(badge.to_owned());
    }
    lines.push("\\end{figure}".to_owned());
    lines.join("\n")
}
