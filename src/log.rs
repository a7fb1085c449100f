use std::sync::Once;

static LOG_INITIALIZED: Once = Once::new();

/// Install the process-wide logger, filtered by `GL_FBO_LOG`
///
/// Safe to call more than once; only the first call has an effect.
pub fn init() {
    LOG_INITIALIZED.call_once(|| {
        // Another logger may already be installed by the host application
        let _ = env_logger::try_init_from_env(
            env_logger::Env::new()
                .filter_or("GL_FBO_LOG", "gl_fbo=debug,tinygl=debug")
                .write_style("GL_FBO_LOG_STYLE"),
        );
    });
}
