use helfer_lib::{DbEnv, LibEnv};
use mkenv::{error::ConfigInitError, prelude::*};
use once_cell::sync::OnceCell;

mkenv::make_config! {
    pub struct ApiEnv {
        pub db_env: { DbEnv },

        pub port: {
            var_name: "HELFERTOOL_PORT",
            layers: [
                parsed_from_str<u16>(),
                or_default_val(|| 8000),
            ],
            description: "The port used to expose the API",
            default_val_fmt: "8000",
        },

        pub json_limit: {
            var_name: "HELFERTOOL_JSON_LIMIT",
            layers: [
                parsed_from_str<usize>(),
                or_default_val(|| 64 * 1024),
            ],
            description: "The maximum size of a JSON request body, in bytes",
            default_val_fmt: "64 KiB",
        },
    }
}

static ENV: OnceCell<ApiEnv> = OnceCell::new();

pub fn env() -> &'static ApiEnv {
    ENV.get().unwrap()
}

pub fn init_env() -> anyhow::Result<()> {
    fn map_err(err: ConfigInitError<'_>) -> anyhow::Error {
        anyhow::anyhow!("{err}")
    }

    let env = ApiEnv::define();
    let lib_env = LibEnv::define();
    env.try_init().map_err(map_err)?;
    lib_env.try_init().map_err(map_err)?;
    helfer_lib::init_env(lib_env);
    let _ = ENV.set(env);

    Ok(())
}
