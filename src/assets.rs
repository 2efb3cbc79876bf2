//! Asynchronous asset loading.
//!
//! Textures and the font are requested concurrently; each load resolves
//! independently and in no particular order. A failed load is logged and its
//! slot stays `None` — the corresponding visual simply never appears, nothing
//! retries and nothing is surfaced to the user.

use crate::texture::Texture;

/// Relative asset paths, resolved against the configured asset root
/// (a directory on native, the site origin on the web).
pub const FLAG_TEXTURE: &str = "textures/flag.png";
pub const SCRIPT_TEXTURE: &str = "textures/script.png";
pub const MATCAP_TEXTURE: &str = "matcaps/default.png";
pub const FONT: &str = "fonts/regular.ttf";

#[cfg(target_arch = "wasm32")]
fn format_url(base: &str, file_name: &str) -> String {
    let window = web_sys::window().expect("no window");
    let origin = window.location().origin().expect("no origin");
    format!("{}/{}/{}", origin, base.trim_matches('/'), file_name)
}

pub async fn load_binary(base: &str, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(base, file_name);
        reqwest::get(&url).await?.error_for_status()?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(base).join(file_name);
        std::fs::read(path)?
    };

    Ok(data)
}

pub async fn load_texture(
    base: &str,
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    let data = load_binary(base, file_name).await?;
    Texture::from_bytes(device, queue, &data, file_name)
}

pub async fn load_font(base: &str, file_name: &str) -> anyhow::Result<fontdue::Font> {
    let data = load_binary(base, file_name).await?;
    fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
        .map_err(|e| anyhow::anyhow!("failed to parse font {}: {}", file_name, e))
}

/// Everything the scene builder may consume once resolved.
///
/// Slots are `Option`: an absent texture means its mesh is skipped, an absent
/// font means the text mesh is never built.
pub struct Assets {
    pub flag_texture: Option<Texture>,
    pub script_texture: Option<Texture>,
    pub matcap_texture: Option<Texture>,
    pub font: Option<fontdue::Font>,
}

impl Assets {
    /// Drive all loads concurrently and collect whatever resolved.
    pub async fn load(base: &str, device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let (flag_texture, script_texture, matcap_texture, font) = futures::join!(
            load_texture(base, FLAG_TEXTURE, device, queue),
            load_texture(base, SCRIPT_TEXTURE, device, queue),
            load_texture(base, MATCAP_TEXTURE, device, queue),
            load_font(base, FONT),
        );

        Self {
            flag_texture: tolerate(FLAG_TEXTURE, flag_texture),
            script_texture: tolerate(SCRIPT_TEXTURE, script_texture),
            matcap_texture: tolerate(MATCAP_TEXTURE, matcap_texture),
            font: tolerate(FONT, font),
        }
    }
}

fn tolerate<T>(name: &str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("asset {} did not load ({}), omitting its visual", name, e);
            None
        }
    }
}
