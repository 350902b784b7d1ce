use std::fs;
use std::path::Path;

// Embeds the trunk build of the frontend. Without one, an empty directory is
// created so that `include_dir!` still has something to point at.
fn main() {
    let out_dir = Path::new("static");
    let embedded_dir = out_dir.join("dist");
    let dist_dir = Path::new("../frontend/dist");

    if dist_dir.exists() {
        let _ = fs::remove_dir_all(out_dir);
        fs::create_dir_all(out_dir).expect("create static dir");
        fs_extra::dir::copy(
            dist_dir,
            out_dir,
            &fs_extra::dir::CopyOptions::new().overwrite(true),
        )
        .expect("copy frontend dist");
    } else if !embedded_dir.exists() {
        fs::create_dir_all(&embedded_dir).expect("create static/dist dir");
    }
    println!("cargo:rerun-if-changed=../frontend/dist");
}
