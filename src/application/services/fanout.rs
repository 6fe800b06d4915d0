//! New-ride notification fan-out derivation.

use uuid::Uuid;

use crate::domain::{Group, Notification};

/// One notification per (member, group) pair across the driver's groups,
/// skipping the driver. A member who shares two groups with the driver
/// gets two notifications, one per group.
pub fn derive_fan_out(groups: &[Group], driver_id: Uuid, ride_id: Uuid) -> Vec<Notification> {
    let mut out = Vec::new();
    for group in groups {
        for member in &group.member_ids {
            if *member == driver_id {
                continue;
            }
            out.push(Notification::new(*member, group.id, ride_id));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_the_driver() {
        let driver = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut group = Group::new("g".into(), "#fff".into(), driver);
        group.add_member(member);

        let ride = Uuid::new_v4();
        let notifs = derive_fan_out(&[group], driver, ride);
        assert_eq!(notifs.len(), 1);
        assert_eq!(notifs[0].user_id, member);
        assert_eq!(notifs[0].ride_id, ride);
        assert!(!notifs[0].read);
    }

    #[test]
    fn member_in_two_groups_gets_two_notifications() {
        let driver = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut a = Group::new("a".into(), "#fff".into(), driver);
        a.add_member(member);
        let mut b = Group::new("b".into(), "#000".into(), driver);
        b.add_member(member);

        let notifs = derive_fan_out(&[a.clone(), b.clone()], driver, Uuid::new_v4());
        assert_eq!(notifs.len(), 2);
        let groups: Vec<Uuid> = notifs.iter().map(|n| n.group_id).collect();
        assert!(groups.contains(&a.id));
        assert!(groups.contains(&b.id));
    }

    #[test]
    fn no_groups_means_no_notifications() {
        let notifs = derive_fan_out(&[], Uuid::new_v4(), Uuid::new_v4());
        assert!(notifs.is_empty());
    }
}
