use winit::dpi::PhysicalSize;

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        if let Some(f) = preferred.into_iter().find(|f| formats.contains(f)) {
            return Some(f);
        }
    }

    formats.first().copied()
}

pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Records the new size and reconfigures the surface.
///
/// A zero-area size (minimized window) is recorded but not applied; wgpu
/// rejects zero-sized surface configurations.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;

    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;

    surface.configure(device, config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode as Alpha, TextureFormat as Fmt};

    #[test]
    fn srgb_preferred_when_available() {
        let formats = [Fmt::Bgra8Unorm, Fmt::Rgba8UnormSrgb];
        assert_eq!(choose_surface_format(&formats, true), Some(Fmt::Rgba8UnormSrgb));
    }

    #[test]
    fn bgra_srgb_wins_over_rgba_srgb() {
        let formats = [Fmt::Rgba8UnormSrgb, Fmt::Bgra8UnormSrgb];
        assert_eq!(choose_surface_format(&formats, true), Some(Fmt::Bgra8UnormSrgb));
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [Fmt::Rgb10a2Unorm, Fmt::Bgra8Unorm];
        assert_eq!(choose_surface_format(&formats, true), Some(Fmt::Rgb10a2Unorm));
    }

    #[test]
    fn srgb_ignored_when_not_preferred() {
        let formats = [Fmt::Bgra8Unorm, Fmt::Bgra8UnormSrgb];
        assert_eq!(choose_surface_format(&formats, false), Some(Fmt::Bgra8Unorm));
    }

    #[test]
    fn no_formats_is_none() {
        assert_eq!(choose_surface_format(&[], true), None);
    }

    #[test]
    fn requested_alpha_mode_used_when_supported() {
        let modes = [Alpha::Opaque, Alpha::PreMultiplied];
        assert_eq!(choose_alpha_mode(&modes, Some(Alpha::PreMultiplied)), Alpha::PreMultiplied);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let modes = [Alpha::Opaque];
        assert_eq!(choose_alpha_mode(&modes, Some(Alpha::PostMultiplied)), Alpha::Opaque);
        assert_eq!(choose_alpha_mode(&[], None), Alpha::Auto);
    }
}
