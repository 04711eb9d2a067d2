//! Device scoring, queue-family resolution, and candidate selection

use std::collections::BTreeMap;

use ash::vk;

use super::{
    device, DeviceProfile, Instance, PhysicalDevice, QueueFamilyCaps, Surface, VulkanError,
    VulkanResult,
};

/// Mapping from logical queue role to a resolved family index.
///
/// A device is a usable candidate only when every role resolved; the two
/// roles may resolve to the same index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyResolution {
    /// First family advertising graphics capability
    pub graphics: Option<u32>,
    /// First family able to present to the surface
    pub present: Option<u32>,
}

impl QueueFamilyResolution {
    /// Whether every required role resolved to some family index.
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }
}

/// Reference scoring policy: discrete GPUs over integrated, everything else
/// at baseline.
pub fn default_suitability(profile: &DeviceProfile) -> u32 {
    match profile.device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 50_000,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 10_000,
        _ => 0,
    }
}

/// Score every candidate with the given policy.
///
/// The key is the device handle; if the same handle appears twice, the
/// first insertion wins and later ones do not overwrite.
pub fn rate_devices<F>(
    devices: &[(PhysicalDevice, DeviceProfile)],
    policy: F,
) -> BTreeMap<PhysicalDevice, u32>
where
    F: Fn(&DeviceProfile) -> u32,
{
    let mut rated = BTreeMap::new();
    for (device, profile) in devices {
        rated.entry(*device).or_insert_with(|| policy(profile));
    }
    rated
}

/// Resolve the required queue roles against a family capability list.
///
/// Each role independently takes the first qualifying family index, so
/// graphics and present may land on the same index or different ones.
pub fn resolve_queue_families(families: &[QueueFamilyCaps]) -> QueueFamilyResolution {
    let mut resolution = QueueFamilyResolution::default();
    for (index, caps) in families.iter().enumerate() {
        let index = index as u32;
        if caps.graphics && resolution.graphics.is_none() {
            resolution.graphics = Some(index);
        }
        if caps.present && resolution.present.is_none() {
            resolution.present = Some(index);
        }
        if resolution.is_complete() {
            break;
        }
    }
    resolution
}

/// Index of the best-scoring suitable candidate.
///
/// Ties break toward enumeration order: the first maximum wins.
fn best_candidate(candidates: &[(u32, bool)]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, &(score, suitable)) in candidates.iter().enumerate() {
        if !suitable {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// A candidate that resolved every required queue role.
#[derive(Debug, Clone)]
pub struct SelectedDevice {
    /// The chosen device
    pub device: PhysicalDevice,
    /// Its capability snapshot
    pub profile: DeviceProfile,
    /// Resolved queue-family indices
    pub queues: QueueFamilyResolution,
    /// The score the policy assigned
    pub score: u32,
}

/// Enumerate, score, and select the device to build the logical device on.
///
/// A candidate is suitable when both queue roles resolve against `surface`
/// and the required device extensions are available; among suitable
/// candidates the highest score wins, first-seen on ties. Fails with
/// [`VulkanError::NoSuitableDevice`] when nothing qualifies.
pub fn select_physical_device<F>(
    instance: &Instance,
    surface: &Surface,
    policy: F,
) -> VulkanResult<SelectedDevice>
where
    F: Fn(&DeviceProfile) -> u32,
{
    let devices = instance.enumerate_physical_devices()?;
    let profiled: Vec<(PhysicalDevice, DeviceProfile)> = devices
        .iter()
        .map(|&device| (device, device.profile(instance)))
        .collect();
    let rated = rate_devices(&profiled, &policy);

    let required = device::required_device_extensions();
    let mut candidates = Vec::with_capacity(profiled.len());
    let mut resolutions = Vec::with_capacity(profiled.len());
    for &(device, ref profile) in &profiled {
        let resolution = resolve_queue_families(&device.queue_family_caps(instance, surface)?);
        let suitable =
            resolution.is_complete() && device.supports_extensions(instance, &required)?;
        let score = rated.get(&device).copied().unwrap_or(0);
        log::debug!(
            "candidate {}: score {score}, queues {resolution:?}, suitable: {suitable}",
            profile.name
        );
        candidates.push((score, suitable));
        resolutions.push(resolution);
    }

    let index = best_candidate(&candidates).ok_or(VulkanError::NoSuitableDevice)?;
    let (device, profile) = profiled[index].clone();
    let selected = SelectedDevice {
        device,
        profile,
        queues: resolutions[index],
        score: candidates[index].0,
    };
    log::info!("selected GPU: {} (score {})", selected.profile.name, selected.score);
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(device_type: vk::PhysicalDeviceType) -> DeviceProfile {
        DeviceProfile {
            device_type,
            features: vk::PhysicalDeviceFeatures::default(),
            name: "mock".to_owned(),
        }
    }

    fn caps(graphics: bool, present: bool) -> QueueFamilyCaps {
        QueueFamilyCaps { graphics, present }
    }

    #[test]
    fn default_policy_matches_reference_weights() {
        assert_eq!(
            default_suitability(&profile(vk::PhysicalDeviceType::DISCRETE_GPU)),
            50_000
        );
        assert_eq!(
            default_suitability(&profile(vk::PhysicalDeviceType::INTEGRATED_GPU)),
            10_000
        );
        assert_eq!(default_suitability(&profile(vk::PhysicalDeviceType::CPU)), 0);
        assert_eq!(
            default_suitability(&profile(vk::PhysicalDeviceType::VIRTUAL_GPU)),
            0
        );
    }

    #[test]
    fn rating_is_deterministic_over_enumeration_order() {
        let devices = vec![
            (
                PhysicalDevice::from_raw(1),
                profile(vk::PhysicalDeviceType::DISCRETE_GPU),
            ),
            (
                PhysicalDevice::from_raw(2),
                profile(vk::PhysicalDeviceType::INTEGRATED_GPU),
            ),
            (
                PhysicalDevice::from_raw(3),
                profile(vk::PhysicalDeviceType::DISCRETE_GPU),
            ),
        ];
        let rated = rate_devices(&devices, default_suitability);
        assert_eq!(rated[&PhysicalDevice::from_raw(1)], 50_000);
        assert_eq!(rated[&PhysicalDevice::from_raw(2)], 10_000);
        assert_eq!(rated[&PhysicalDevice::from_raw(3)], 50_000);
    }

    #[test]
    fn duplicate_keys_keep_the_first_score() {
        let device = PhysicalDevice::from_raw(7);
        let devices = vec![
            (device, profile(vk::PhysicalDeviceType::DISCRETE_GPU)),
            (device, profile(vk::PhysicalDeviceType::INTEGRATED_GPU)),
        ];
        let rated = rate_devices(&devices, default_suitability);
        assert_eq!(rated.len(), 1);
        assert_eq!(rated[&device], 50_000);
    }

    #[test]
    fn roles_resolve_to_the_first_qualifying_index_independently() {
        let families = [caps(false, true), caps(true, true)];
        let resolution = resolve_queue_families(&families);
        assert_eq!(resolution.graphics, Some(1));
        assert_eq!(resolution.present, Some(0));
        assert!(resolution.is_complete());
    }

    #[test]
    fn shared_family_resolves_both_roles_to_one_index() {
        let families = [caps(true, true)];
        let resolution = resolve_queue_families(&families);
        assert_eq!(resolution.graphics, Some(0));
        assert_eq!(resolution.present, Some(0));
    }

    #[test]
    fn missing_present_support_leaves_the_role_unresolved() {
        let families = [caps(true, false), caps(true, false)];
        let resolution = resolve_queue_families(&families);
        assert_eq!(resolution.graphics, Some(0));
        assert_eq!(resolution.present, None);
        assert!(!resolution.is_complete());
    }

    #[test]
    fn empty_family_list_resolves_nothing() {
        let resolution = resolve_queue_families(&[]);
        assert!(!resolution.is_complete());
    }

    #[test]
    fn first_maximum_wins_on_score_ties() {
        // A(discrete), B(integrated), C(discrete): A beats C.
        let candidates = [(50_000, true), (10_000, true), (50_000, true)];
        assert_eq!(best_candidate(&candidates), Some(0));
    }

    #[test]
    fn unsuitable_candidates_are_skipped_regardless_of_score() {
        let candidates = [(50_000, false), (10_000, true)];
        assert_eq!(best_candidate(&candidates), Some(1));
    }

    #[test]
    fn no_suitable_candidate_selects_nothing() {
        let candidates = [(50_000, false), (10_000, false)];
        assert_eq!(best_candidate(&candidates), None);
        assert_eq!(best_candidate(&[]), None);
    }
}
