//! 核心宏定义
//!
//! 提供统一的宏来减少配置结构体的样板代码

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use game_engine_fx::impl_default;
///
/// struct GustSettings {
///     frequency: f32,
///     strength: f32,
/// }
///
/// impl_default!(GustSettings {
///     frequency: 0.8,
///     strength: 0.3,
/// });
///
/// let gust = GustSettings::default();
/// assert_eq!(gust.frequency, 0.8);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    struct Extent {
        half_width: f32,
        height: f32,
    }

    impl_default!(Extent {
        half_width: 100.0,
        height: 50.0,
    });

    #[test]
    fn test_impl_default() {
        let extent = Extent::default();
        assert_eq!(extent.half_width, 100.0);
        assert_eq!(extent.height, 50.0);
    }
}
