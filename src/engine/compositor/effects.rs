/// ### English
/// Textures owned by the compositor, in fixed order.
///
/// ### 中文
/// 合成器持有的纹理，顺序固定。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureId {
    Video,
    Fractal,
}

impl TextureId {
    pub const ALL: [TextureId; 2] = [TextureId::Video, TextureId::Fractal];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            TextureId::Video => 0,
            TextureId::Fractal => 1,
        }
    }
}

/// ### English
/// Effects the compositor can render. Each samples a fixed set of textures.
///
/// ### 中文
/// 合成器可以渲染的效果。每个效果采样一组固定的纹理。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// ### English
    /// Video with the fractal blended on top.
    ///
    /// ### 中文
    /// 在视频上叠加分形。
    FractalBlend,
    /// ### English
    /// Plain video.
    ///
    /// ### 中文
    /// 纯视频。
    MoviePlayback,
}

impl EffectKind {
    pub const ALL: [EffectKind; 2] = [EffectKind::FractalBlend, EffectKind::MoviePlayback];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            EffectKind::FractalBlend => 0,
            EffectKind::MoviePlayback => 1,
        }
    }

    pub const fn textures(self) -> &'static [TextureId] {
        match self {
            EffectKind::FractalBlend => &[TextureId::Video, TextureId::Fractal],
            EffectKind::MoviePlayback => &[TextureId::Video],
        }
    }
}

/// ### English
/// Which effects are currently on.
///
/// ### 中文
/// 当前开启了哪些效果。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectSet {
    enabled: [bool; EffectKind::ALL.len()],
}

impl EffectSet {
    #[inline]
    pub fn is_enabled(&self, kind: EffectKind) -> bool {
        self.enabled[kind.index()]
    }

    /// ### English
    /// Records the new state; returns whether it changed.
    ///
    /// ### 中文
    /// 记录新状态；返回状态是否改变。
    pub fn set(&mut self, kind: EffectKind, enabled: bool) -> bool {
        let slot = &mut self.enabled[kind.index()];
        let changed = *slot != enabled;
        *slot = enabled;
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = EffectKind> + '_ {
        EffectKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
    }
}
