//! # 几何计算模块
//!
//! ## 设计思路
//!
//! 缩略图采用“先 aspect-fit 再裁剪”的方式得到 aspect-fill 效果：
//! 把目标尺寸的宽高比放进源图矩形，得到源图上的可见区域 `fitted`；
//! 再把整张源图按 `scale = W / fitted.width` 缩放，并平移 `-fitted.origin * scale`，
//! 使可见区域恰好落在 `(0, 0, W, H)` 上，多余部分沿宽高比不一致的轴对称裁掉。
//!
//! 所有函数都是纯函数，相同输入得到逐位相同的结果。

use super::ThumbnailError;

/// 设备无关单位下的尺寸。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 两条边都为有限正数。
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn is_finite(&self) -> bool {
        self.origin.x.is_finite()
            && self.origin.y.is_finite()
            && self.size.width.is_finite()
            && self.size.height.is_finite()
    }

    /// 判断当前矩形是否完整覆盖 `other`（允许 `tolerance` 的浮点误差）。
    pub fn covers(&self, other: &Rect, tolerance: f64) -> bool {
        self.min_x() <= other.min_x() + tolerance
            && self.min_y() <= other.min_y() + tolerance
            && self.max_x() >= other.max_x() - tolerance
            && self.max_y() >= other.max_y() - tolerance
    }
}

/// 在 `bounds` 内放入宽高比为 `aspect` 的最大矩形，并居中。
///
/// 返回的矩形完整位于 `bounds` 内。
pub fn aspect_fit_rect(aspect: Size, bounds: Rect) -> Result<Rect, ThumbnailError> {
    if !aspect.is_positive() {
        return Err(ThumbnailError::InvalidRequest(format!(
            "宽高比尺寸无效：{}x{}",
            aspect.width, aspect.height
        )));
    }
    if !bounds.size.is_positive() || !bounds.is_finite() {
        return Err(ThumbnailError::InvalidRequest(format!(
            "容器矩形无效：{}x{}",
            bounds.width(),
            bounds.height()
        )));
    }

    let factor = (bounds.width() / aspect.width).min(bounds.height() / aspect.height);
    let fitted = aspect.scaled(factor);

    Ok(Rect {
        origin: Point::new(
            bounds.min_x() + (bounds.width() - fitted.width) / 2.0,
            bounds.min_y() + (bounds.height() - fitted.height) / 2.0,
        ),
        size: fitted,
    })
}

/// 一次缩略图绘制的完整几何信息。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropGeometry {
    /// 源图坐标下的可见区域（目标宽高比 fit 进源图矩形）。
    pub fitted: Rect,
    /// 统一缩放系数 `target.width / fitted.width`。
    pub scale: f64,
    /// 整张源图在目标画布上的绘制矩形，原点可能为负。
    pub draw_rect: Rect,
}

impl CropGeometry {
    /// 绘制矩形是否无缝覆盖目标区域（aspect-fill 不变量）。
    pub fn covers_target(&self, target: Size) -> bool {
        let tolerance = 1e-9 * target.width.max(target.height).max(1.0);
        self.draw_rect.covers(&Rect::from_size(target), tolerance)
    }
}

/// 计算 aspect-fill 裁剪几何。
///
/// # 示例
/// ```rust
/// use verid_thumbnails::thumbnail::geometry::{aspect_fill_crop, Size};
///
/// let geometry = aspect_fill_crop(Size::new(200.0, 400.0), Size::new(100.0, 100.0))?;
/// assert_eq!(geometry.scale, 0.5);
/// assert_eq!(geometry.draw_rect.origin.y, -50.0);
/// assert_eq!(geometry.draw_rect.size.height, 200.0);
/// # Ok::<(), verid_thumbnails::thumbnail::ThumbnailError>(())
/// ```
pub fn aspect_fill_crop(source: Size, target: Size) -> Result<CropGeometry, ThumbnailError> {
    if !source.is_positive() {
        return Err(ThumbnailError::InvalidRequest(format!(
            "源图尺寸无效：{}x{}",
            source.width, source.height
        )));
    }
    if !target.is_positive() {
        return Err(ThumbnailError::InvalidRequest(format!(
            "目标尺寸无效：{}x{}",
            target.width, target.height
        )));
    }

    let fitted = aspect_fit_rect(target, Rect::from_size(source))?;
    let scale = target.width / fitted.width();
    let draw_rect = Rect {
        origin: Point::new(-fitted.min_x() * scale, -fitted.min_y() * scale),
        size: source.scaled(scale),
    };

    Ok(CropGeometry {
        fitted,
        scale,
        draw_rect,
    })
}
