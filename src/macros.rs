/// Builds a [`WsvLine`](crate::WsvLine) from a list of values.
///
/// Each item is either `null` or an expression convertible into `String`.
/// The line gets default spacing and no comment.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::wsv_line;
///
/// let line = wsv_line!["name", null, "two words", String::from("")];
/// assert!(line.is_null(1));
/// assert_eq!(line.to_string(), "name - \"two words\" \"\"");
///
/// assert!(wsv_line![].is_empty());
/// ```
#[macro_export]
macro_rules! wsv_line {
    (@push $line:ident;) => {};

    (@push $line:ident; null $(, $($rest:tt)*)?) => {
        $line.push_null();
        $crate::wsv_line!(@push $line; $($($rest)*)?);
    };

    (@push $line:ident; $value:expr $(, $($rest:tt)*)?) => {
        $line.push_value($value);
        $crate::wsv_line!(@push $line; $($($rest)*)?);
    };

    ($($items:tt)*) => {{
        #[allow(unused_mut)]
        let mut line = $crate::WsvLine::new();
        $crate::wsv_line!(@push line; $($items)*);
        line
    }};
}
