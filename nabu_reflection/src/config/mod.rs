//! Compile-time limits generated from `config/<profile>.toml`, plus runtime preferences

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::file_processing::MAX_FILE_SIZE > 0);
        assert!(compile_time::lexical::MAX_TOKEN_COUNT > 0);
        assert!(compile_time::batch_processing::MAX_WORKER_THREADS >= 1);
        assert!(
            compile_time::logging::MAX_LOG_EVENTS_PER_FILE <= compile_time::logging::LOG_BUFFER_SIZE
        );
    }
}
