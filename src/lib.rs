pub mod utils;
pub mod models;
pub mod quadtree;
pub mod interactions;
pub mod swarm;
pub mod solvers;
#[cfg(feature = "distributed")]
pub mod partition;

/// ### General helper function
/// - Asserts that two floating point numbers are approximately equal.
///
/// ### Arguments
///
/// * `a` - The first floating point number.
/// * `b` - The second floating point number.
/// * `epsilon` - The maximum difference between `a` and `b` for them to be considered equal.
/// * `optional_message` - An optional message to display if the assertion fails.
///
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64, optional_message: Option<&str>) {
    match optional_message {
        Some(message) => assert!((a - b).abs() < epsilon, "a: {:?},\nb: {:?},\nepsilon: {:?},\n message: {:?}", a, b, epsilon, message),
        None => assert!((a - b).abs() < epsilon, "Expected {} to be approximately equal to {} (epsilon: {})", a, b, epsilon),
    }
}

/// Asserts that two flat state or velocity buffers agree element-wise within `epsilon`.
pub fn assert_fields_eq(a: &[f64], b: &[f64], epsilon: f64, message: &str) {
    assert_eq!(a.len(), b.len(), "{}: buffers differ in length", message);
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!(
            (x - y).abs() < epsilon,
            "{}: scalar {} differs ({} vs {}, epsilon {})",
            message,
            i,
            x,
            y,
            epsilon
        );
    }
}
