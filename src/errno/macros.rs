#[macro_export]
macro_rules! errno {
    ($errno_expr: expr, $error_msg: expr) => {{
        let inner_error = {
            let errno: $crate::Errno = $errno_expr;
            let msg: &'static str = $error_msg;
            (errno, msg)
        };
        $crate::Error::embedded(
            inner_error,
            Some($crate::ErrorLocation::new(file!(), line!())),
        )
    }};
}

#[macro_export]
macro_rules! return_errno {
    ($errno_expr: expr, $error_msg: expr) => {{
        return Err(errno!($errno_expr, $error_msg));
    }};
}
