use std::fs;
use std::io::Result;
use std::path::{Path, PathBuf};

#[cfg(target_os = "android")]
fn android_files_dir() -> Option<PathBuf> {
    use jni::{
        objects::{JObject, JString},
        JavaVM,
    };
    unsafe {
        let ctx = ndk_context::android_context();
        let vm = JavaVM::from_raw(ctx.vm().cast()).ok()?;
        let mut env = vm.attach_current_thread().ok()?;
        let activity = JObject::from_raw(ctx.context().cast());
        let files_dir = env
            .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_obj = env
            .call_method(files_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_jstring: JString = JString::from(abs_path_obj);
        let abs_path: String = env.get_string(&abs_path_jstring).ok()?.into();
        Some(PathBuf::from(abs_path))
    }
}

/// Get the app data directory for the current platform
pub fn get_app_data_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        if let Some(dir) = android_files_dir() {
            return dir;
        }
        // Fallbacks
        for d in [
            "/data/user/0/de.teilgedanken.photojournal/files",
            "/data/data/de.teilgedanken.photojournal/files",
        ] {
            let p = PathBuf::from(d);
            if p.exists() {
                return p;
            }
        }
        PathBuf::from("./data")
    }

    #[cfg(not(target_os = "android"))]
    {
        // On desktop, use ./data directory
        PathBuf::from("./data")
    }
}

/// Directory for export archives; on Android this is reachable over USB
pub fn get_export_base_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        PathBuf::from(
            "/storage/emulated/0/Android/data/de.teilgedanken.photojournal/files/exports",
        )
    }

    #[cfg(not(target_os = "android"))]
    {
        get_app_data_dir().join("exports")
    }
}

/// Creates the parent directory of `path` if it is missing
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_parent_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a/b/export.zip");
        ensure_parent_dir(&target).unwrap();
        assert!(tmp.path().join("a/b").is_dir());
        assert!(!target.exists());
    }

    #[test]
    fn test_ensure_parent_dir_accepts_bare_file_name() {
        ensure_parent_dir(Path::new("export.zip")).unwrap();
    }
}
